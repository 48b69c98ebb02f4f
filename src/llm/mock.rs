//! Mock LLM 客户端（无需 API）
//!
//! - MockLlmClient：从 planner prompt 中读出编制表与指令，把整条指令交给第一个单元，
//!   便于本地跑通整条委派链
//! - ScriptedLlmClient：按顺序返回预设回复并记录收到的 prompt，供测试使用

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::hierarchy::prompt::{ORDER_HEADER, ROSTER_HEADER};
use crate::llm::LlmClient;
use crate::memory::{Message, Role};

/// Mock 客户端：单任务计划，负责单元取编制表第一项
#[derive(Debug, Default)]
pub struct MockLlmClient;

fn last_user(messages: &[Message]) -> &str {
    messages
        .iter()
        .rev()
        .find(|m| m.role == Role::User)
        .map(|m| m.content.as_str())
        .unwrap_or("")
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        let prompt = last_user(messages);

        let first_unit = prompt
            .lines()
            .skip_while(|l| l.trim() != ROSTER_HEADER)
            .skip(1)
            .map(str::trim)
            .take_while(|l| l.starts_with("- "))
            .find_map(|l| l[2..].split(':').next().map(|s| s.trim().to_string()));

        let order = prompt
            .lines()
            .find_map(|l| l.trim().strip_prefix(ORDER_HEADER))
            .map(str::trim)
            .unwrap_or("(no input)");

        let missions = match first_unit {
            Some(unit) => serde_json::json!([{ "description": order, "responsible_unit": unit }]),
            None => serde_json::json!([]),
        };
        Ok(serde_json::json!({ "missions": missions }).to_string())
    }
}

/// 脚本客户端：依次弹出预设回复，用尽后返回 Err
#[derive(Debug, Default)]
pub struct ScriptedLlmClient {
    responses: Mutex<VecDeque<Result<String, String>>>,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedLlmClient {
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// 全部为成功回复的便捷构造
    pub fn replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(replies.into_iter().map(|r| Ok(r.into())).collect())
    }

    /// 收到过的 prompt（每次调用的最后一条 user 消息）
    pub fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

#[async_trait]
impl LlmClient for ScriptedLlmClient {
    async fn complete(&self, messages: &[Message]) -> Result<String, String> {
        self.prompts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(last_user(messages).to_string());
        self.responses
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front()
            .unwrap_or_else(|| Err("no scripted response left".to_string()))
    }
}
