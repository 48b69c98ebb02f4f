//! planner prompt 构造
//!
//! 结构固定：身份与职责 -> 编制表 -> （访客协议）-> （历史对话）-> 输出 schema -> 指令。
//! 编制表与指令各用一个固定标题行，MockLlmClient 依赖这两个标题读取 prompt。

use crate::context::AppContext;
use crate::hierarchy::mission::plan_schema_json;
use crate::hierarchy::roster::Roster;
use crate::memory::{render_history, Message};

pub const ROSTER_HEADER: &str = "Available units:";
pub const ORDER_HEADER: &str = "Order:";

const GUEST_PROTOCOL: &str = "\
Guest protocol (the caller is not signed in):
1. Establish origin: find out where the visitor is travelling from before recommending anything.
2. Answer: address the question with published information only.
3. Invite registration: close by inviting the visitor to create an account for saved trips and reviews.";

/// 某个 planner 的固定说明
#[derive(Debug, Clone)]
pub struct PlannerBrief {
    pub commander: String,
    pub mission_statement: String,
    /// (单元名, 专长)，按编制顺序
    pub roster: Vec<(String, String)>,
    /// 调用方为访客时是否加入访客协议
    pub guest_protocol: bool,
    /// 是否把历史对话写入 prompt
    pub include_history: bool,
}

impl PlannerBrief {
    pub fn for_roster(
        commander: impl Into<String>,
        mission_statement: impl Into<String>,
        roster: &Roster,
    ) -> Self {
        Self {
            commander: commander.into(),
            mission_statement: mission_statement.into(),
            roster: roster
                .entries()
                .iter()
                .map(|e| (e.id.to_string(), e.specialty.clone()))
                .collect(),
            guest_protocol: false,
            include_history: false,
        }
    }

    /// 顶层：带访客协议与历史对话
    pub fn coordinator(roster: &Roster) -> Self {
        Self {
            guest_protocol: true,
            include_history: true,
            ..Self::for_roster(
                "the Coordinator of a tourism platform",
                "You receive orders from platform users and split them into missions for your divisions.",
                roster,
            )
        }
    }
}

pub fn build_planner_prompt(
    brief: &PlannerBrief,
    order: &str,
    ctx: &AppContext,
    history: &[Message],
) -> String {
    let mut prompt = format!(
        "You are {}. {}\n\
         Break the order into missions and assign each mission to exactly one unit from the list below. \
         Use the unit names exactly as written and keep the missions in execution order.\n\n",
        brief.commander, brief.mission_statement
    );

    prompt.push_str(ROSTER_HEADER);
    prompt.push('\n');
    for (name, specialty) in &brief.roster {
        prompt.push_str(&format!("- {}: {}\n", name, specialty));
    }
    prompt.push('\n');

    if brief.guest_protocol && ctx.is_guest {
        prompt.push_str(GUEST_PROTOCOL);
        prompt.push_str("\n\n");
    }

    if brief.include_history && !history.is_empty() {
        prompt.push_str("Conversation so far:\n");
        prompt.push_str(&render_history(history));
        prompt.push_str("\n\n");
    }

    prompt.push_str("Respond with JSON only, matching this schema:\n");
    prompt.push_str(&plan_schema_json());
    prompt.push_str("\n\n");
    prompt.push_str(&format!("{} {}", ORDER_HEADER, order));
    prompt
}
