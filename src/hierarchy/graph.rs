//! 单层工作流图：plan -> route -> delegate -> ... -> compile
//!
//! Coordinator、planner 单元与模拟 planner 共用这台状态机，区别只在规划策略与编制表。
//! 任务严格逐个出队、逐个等待，没有并发扇出。

use std::sync::Arc;

use crate::core::MissionError;
use crate::hierarchy::planning::PlanningStrategy;
use crate::hierarchy::roster::Roster;
use crate::hierarchy::state::TierState;
use crate::hierarchy::unit::{TierInput, Unit};
use crate::hierarchy::unit_id::UnitId;
use crate::memory::Message;

/// 图中的节点
enum Node {
    Plan,
    Route,
    Delegate(UnitId, Arc<dyn Unit>),
    Compile,
}

/// 执行一次完整的层内流程，返回最终状态（日志中的层名取编制表的所属单元）
pub async fn run_tier(roster: &Roster, planning: &dyn PlanningStrategy, input: TierInput) -> TierState {
    let tier = roster.owner();
    let TierInput {
        order,
        app_context,
        conversation_history,
    } = input;
    let mut state = TierState::new(order, app_context);
    let mut node = Node::Plan;

    loop {
        node = match node {
            Node::Plan => {
                plan(tier, planning, &mut state, &conversation_history).await;
                Node::Route
            }
            Node::Route => route(tier, roster, &mut state),
            Node::Delegate(id, unit) => {
                delegate(tier, id, unit, &mut state).await;
                Node::Route
            }
            Node::Compile => {
                let report = state.compile();
                tracing::debug!("{} compiled report: {}", tier, report);
                break;
            }
        };
    }
    state
}

async fn plan(
    tier: &str,
    planning: &dyn PlanningStrategy,
    state: &mut TierState,
    history: &[Message],
) {
    match planning
        .plan(&state.input_order, &state.app_context, history)
        .await
    {
        Ok(plan) => {
            tracing::info!("{} planned {} mission(s)", tier, plan.len());
            state.set_plan(plan);
        }
        Err(e) => {
            tracing::warn!("{} planning failed: {}", tier, e);
            state.fail(e);
        }
    }
}

fn route(tier: &str, roster: &Roster, state: &mut TierState) -> Node {
    if state.is_failed() {
        return Node::Compile;
    }
    let Some(head) = state.task_queue.front() else {
        return Node::Compile;
    };

    match roster.resolve(&head.responsible_unit) {
        Ok((id, unit)) => {
            tracing::debug!("{} routing '{}' to {}", tier, head.description, id);
            Node::Delegate(id, unit)
        }
        Err(e) => {
            tracing::error!("{} discarded mission '{}': {}", tier, head.description, e);
            state.task_queue.pop_front();
            state.fail(e);
            Node::Route
        }
    }
}

async fn delegate(tier: &str, id: UnitId, unit: Arc<dyn Unit>, state: &mut TierState) {
    let Some(mission) = state.task_queue.pop_front() else {
        return;
    };
    tracing::info!("{} delegating to {}: {}", tier, id, mission.description);

    let input = TierInput::new(mission.description.clone(), state.app_context.clone());
    match unit.invoke(input).await {
        Ok(report) => {
            if let Some(child_error) = &report.error {
                tracing::warn!("{} reported failure: {}", id, child_error);
            }
            state.record(id.as_str(), mission.description, &report.final_report);
        }
        Err(e) => {
            let error = MissionError::Delegation {
                unit: id.to_string(),
                reason: e.to_string(),
            };
            tracing::error!("{} {}", tier, error);
            state.fail(error);
        }
    }
}
