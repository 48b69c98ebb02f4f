//! planner 模式的中/下层单元（含模拟 planner）
//!
//! 与 Coordinator 同形：plan -> route -> delegate 循环 -> compile，但只面向自己的下级编制，
//! 不读历史对话，也不加访客协议。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{EngineError, UnitError};
use crate::hierarchy::graph::run_tier;
use crate::hierarchy::planning::{ModelPlanning, PlanningStrategy, SimulatedPlanning};
use crate::hierarchy::prompt::PlannerBrief;
use crate::hierarchy::roster::Roster;
use crate::hierarchy::state::TierState;
use crate::hierarchy::unit::{TierInput, TierReport, Unit};
use crate::hierarchy::unit_id::UnitId;
use crate::llm::ModelRouter;

pub struct PlannerUnit {
    id: UnitId,
    roster: Roster,
    planning: Arc<dyn PlanningStrategy>,
}

impl PlannerUnit {
    /// 由模型规划
    pub fn planned(id: UnitId, router: Arc<ModelRouter>, roster: Roster) -> Self {
        let brief = PlannerBrief::for_roster(
            format!("the {} unit", id),
            format!("Your unit handles {}.", id.specialty()),
            &roster,
        );
        Self::with_planning(id, roster, Arc::new(ModelPlanning::new(router, brief)))
    }

    /// 模拟规划：整条指令交给 child；child 必须在编制内
    pub fn simulated(id: UnitId, child: UnitId, roster: Roster) -> Result<Self, EngineError> {
        if !roster.contains(child) {
            return Err(EngineError::MissingChild {
                tier: id.to_string(),
                unit: child.to_string(),
            });
        }
        Ok(Self::with_planning(
            id,
            roster,
            Arc::new(SimulatedPlanning::new(child)),
        ))
    }

    pub fn with_planning(id: UnitId, roster: Roster, planning: Arc<dyn PlanningStrategy>) -> Self {
        Self {
            id,
            roster,
            planning,
        }
    }

    pub fn id(&self) -> UnitId {
        self.id
    }

    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// 执行并返回完整的层内状态（测试与调试用）
    pub async fn run(&self, input: TierInput) -> TierState {
        let input = TierInput::new(input.order, input.app_context);
        run_tier(&self.roster, self.planning.as_ref(), input).await
    }
}

#[async_trait]
impl Unit for PlannerUnit {
    fn name(&self) -> &str {
        self.id.as_str()
    }

    async fn invoke(&self, input: TierInput) -> Result<TierReport, UnitError> {
        Ok(self.run(input).await.report())
    }
}
