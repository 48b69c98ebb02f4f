//! Coordinator：整个层级的入口（第 1 层）
//!
//! 把顶层指令拆成第 2 层任务，逐个委派并汇总报告；规划 prompt 带第 2 层编制、
//! 访客协议（调用方未登录时）与历史对话。返回时在调用方历史的副本后追加本轮两条消息。

use std::sync::Arc;

use async_trait::async_trait;
use tracing::Instrument;

use crate::context::AppContext;
use crate::core::UnitError;
use crate::hierarchy::graph::run_tier;
use crate::hierarchy::planning::{ModelPlanning, PlanningStrategy};
use crate::hierarchy::prompt::PlannerBrief;
use crate::hierarchy::roster::Roster;
use crate::hierarchy::state::TierState;
use crate::hierarchy::unit::{TierInput, TierReport, Unit};
use crate::llm::ModelRouter;
use crate::memory::{append_turn, Message};

pub const COORDINATOR: &str = "Coordinator";

/// 一次顶层请求的结果
#[derive(Debug, Clone)]
pub struct CoordinatorOutcome {
    pub final_report: String,
    pub error: Option<String>,
    /// 调用方历史 + 本轮指令 + 本轮报告；由调用方保存并在下次请求时传回
    pub conversation_history: Vec<Message>,
    pub state: TierState,
}

impl CoordinatorOutcome {
    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

pub struct Coordinator {
    roster: Roster,
    planning: Arc<dyn PlanningStrategy>,
}

impl Coordinator {
    pub fn new(router: Arc<ModelRouter>, roster: Roster) -> Self {
        let brief = PlannerBrief::coordinator(&roster);
        Self::with_planning(roster, Arc::new(ModelPlanning::new(router, brief)))
    }

    pub fn with_planning(roster: Roster, planning: Arc<dyn PlanningStrategy>) -> Self {
        Self { roster, planning }
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    pub async fn handle(&self, order: &str, ctx: &AppContext, history: &[Message]) -> CoordinatorOutcome {
        let request_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("request", request_id = %request_id, guest = ctx.is_guest);

        async {
            tracing::info!("Coordinator received order: {}", order);
            let input = TierInput::new(order, ctx.clone()).with_history(history.to_vec());
            let state = run_tier(&self.roster, self.planning.as_ref(), input).await;

            let final_report = state.final_report.clone().unwrap_or_default();
            match &state.error {
                Some(e) => tracing::warn!("Coordinator finished with error: {}", e),
                None => tracing::info!(
                    "Coordinator finished: {} mission(s) completed",
                    state.completed_missions.len()
                ),
            }

            CoordinatorOutcome {
                conversation_history: append_turn(history, order, &final_report),
                error: state.error.clone(),
                final_report,
                state,
            }
        }
        .instrument(span)
        .await
    }
}

#[async_trait]
impl Unit for Coordinator {
    fn name(&self) -> &str {
        COORDINATOR
    }

    async fn invoke(&self, input: TierInput) -> Result<TierReport, UnitError> {
        let outcome = self
            .handle(&input.order, &input.app_context, &input.conversation_history)
            .await;
        Ok(outcome.state.report())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy::planning::SimulatedPlanning;
    use crate::hierarchy::unit_id::UnitId;

    struct Echo;

    #[async_trait]
    impl Unit for Echo {
        fn name(&self) -> &str {
            "echo"
        }

        async fn invoke(&self, input: TierInput) -> Result<TierReport, UnitError> {
            Ok(TierReport::ok(format!("handled {}", input.order)))
        }
    }

    #[tokio::test]
    async fn test_history_is_extended_not_mutated() {
        let roster = Roster::new(COORDINATOR).with(UnitId::AccountServices, Arc::new(Echo));
        let coordinator = Coordinator::with_planning(
            roster,
            Arc::new(SimulatedPlanning::new(UnitId::AccountServices)),
        );
        let history = vec![Message::user("hello"), Message::assistant("hi")];

        let outcome = coordinator.handle("show my profile", &AppContext::user("u1"), &history).await;

        assert!(outcome.is_ok());
        assert_eq!(history.len(), 2);
        assert_eq!(outcome.conversation_history.len(), 4);
        assert_eq!(outcome.conversation_history[2], Message::user("show my profile"));
        assert_eq!(
            outcome.conversation_history[3],
            Message::assistant("- AccountServices completed 'show my profile': handled show my profile")
        );
    }
}
