//! 四级指挥结构
//!
//! - **unit_id / mission**: 单元标识、任务与计划解析
//! - **state / graph**: 单层工作记忆与 plan -> route -> delegate -> compile 状态机
//! - **planning / prompt**: 规划策略（模型 / 模拟）与 planner prompt
//! - **coordinator / planner_unit / supervisor / leaf**: 四种单元模板
//! - **roster / standard**: 编制表与标准编制

pub mod coordinator;
pub mod graph;
pub mod leaf;
pub mod mission;
pub mod planner_unit;
pub mod planning;
pub mod prompt;
pub mod roster;
pub mod standard;
pub mod state;
pub mod supervisor;
pub mod unit;
pub mod unit_id;

pub use coordinator::{Coordinator, CoordinatorOutcome, COORDINATOR};
pub use graph::run_tier;
pub use leaf::{ArgumentStrategy, LeafUnit, StaticArguments};
pub use mission::{parse_plan, plan_schema_json, Mission, PlanPayload};
pub use planner_unit::PlannerUnit;
pub use planning::{ModelPlanning, PlanningStrategy, SimulatedPlanning};
pub use prompt::{build_planner_prompt, PlannerBrief};
pub use roster::{Roster, RosterEntry};
pub use standard::{build_coordinator, build_roster};
pub use state::{CompletedMission, TierState, MISSION_FAILED, NO_REPORT};
pub use supervisor::SupervisorUnit;
pub use unit::{TierInput, TierReport, Unit};
pub use unit_id::UnitId;
