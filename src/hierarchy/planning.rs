//! 规划策略
//!
//! - ModelPlanning：构造 prompt，经 ModelRouter 调用模型，再解析为 Plan
//! - SimulatedPlanning：不调用模型，把整条指令原样交给固定子单元

use std::sync::Arc;

use async_trait::async_trait;

use crate::context::AppContext;
use crate::core::MissionError;
use crate::hierarchy::mission::{parse_plan, Mission};
use crate::hierarchy::prompt::{build_planner_prompt, PlannerBrief};
use crate::hierarchy::unit_id::UnitId;
use crate::llm::ModelRouter;
use crate::memory::Message;

#[async_trait]
pub trait PlanningStrategy: Send + Sync {
    async fn plan(
        &self,
        order: &str,
        ctx: &AppContext,
        history: &[Message],
    ) -> Result<Vec<Mission>, MissionError>;
}

/// 模型规划
pub struct ModelPlanning {
    router: Arc<ModelRouter>,
    brief: PlannerBrief,
}

impl ModelPlanning {
    pub fn new(router: Arc<ModelRouter>, brief: PlannerBrief) -> Self {
        Self { router, brief }
    }
}

#[async_trait]
impl PlanningStrategy for ModelPlanning {
    async fn plan(
        &self,
        order: &str,
        ctx: &AppContext,
        history: &[Message],
    ) -> Result<Vec<Mission>, MissionError> {
        let history: &[Message] = if self.brief.include_history { history } else { &[] };
        let prompt = build_planner_prompt(&self.brief, order, ctx, history);
        let reply = self.router.invoke(&prompt, history, ctx).await;
        if reply.trim().is_empty() {
            return Err(MissionError::Planning("model returned an empty response".to_string()));
        }
        tracing::debug!("{} planner reply: {}", self.brief.commander, reply);
        parse_plan(&reply)
    }
}

/// 模拟规划：单任务计划，确定性
#[derive(Debug, Clone, Copy)]
pub struct SimulatedPlanning {
    unit: UnitId,
}

impl SimulatedPlanning {
    pub fn new(unit: UnitId) -> Self {
        Self { unit }
    }
}

#[async_trait]
impl PlanningStrategy for SimulatedPlanning {
    async fn plan(
        &self,
        order: &str,
        _ctx: &AppContext,
        _history: &[Message],
    ) -> Result<Vec<Mission>, MissionError> {
        Ok(vec![Mission::new(order, self.unit.as_str())])
    }
}
