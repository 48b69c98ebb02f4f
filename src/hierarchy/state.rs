//! 单层工作记忆（TierState）
//!
//! 每次调用新建、调用结束即丢弃。error 是终止哨兵：只在为空时写入，调用期内从不清除。

use std::collections::VecDeque;

use crate::context::AppContext;
use crate::core::MissionError;
use crate::hierarchy::mission::Mission;
use crate::hierarchy::unit::TierReport;

/// 有错误时 compile 的固定前缀
pub const MISSION_FAILED: &str = "Mission failed";

/// 子单元报告为空时的占位文本
pub const NO_REPORT: &str = "No report provided.";

/// 计划为空且无错误时的报告
pub const EMPTY_PLAN: &str = "No missions were planned.";

/// 完成记录：每次成功委派追加一条，保持出队顺序
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletedMission {
    pub unit_name: String,
    pub mission_description: String,
    pub report_text: String,
}

impl CompletedMission {
    fn render(&self) -> String {
        format!(
            "- {} completed '{}': {}",
            self.unit_name, self.mission_description, self.report_text
        )
    }
}

#[derive(Debug, Clone, Default)]
pub struct TierState {
    pub input_order: String,
    pub app_context: AppContext,
    pub plan: Vec<Mission>,
    pub task_queue: VecDeque<Mission>,
    pub completed_missions: Vec<CompletedMission>,
    pub final_report: Option<String>,
    pub error: Option<String>,
}

impl TierState {
    pub fn new(order: impl Into<String>, app_context: AppContext) -> Self {
        Self {
            input_order: order.into(),
            app_context,
            ..Default::default()
        }
    }

    /// 装入计划；队列是计划的副本
    pub fn set_plan(&mut self, plan: Vec<Mission>) {
        self.task_queue = plan.iter().cloned().collect();
        self.plan = plan;
    }

    /// 写入错误哨兵（已有错误时保留第一条）
    pub fn fail(&mut self, error: MissionError) {
        if self.error.is_none() {
            self.error = Some(error.to_string());
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn record(
        &mut self,
        unit_name: impl Into<String>,
        mission_description: impl Into<String>,
        report_text: &str,
    ) {
        let report_text = if report_text.trim().is_empty() {
            NO_REPORT.to_string()
        } else {
            report_text.to_string()
        };
        self.completed_missions.push(CompletedMission {
            unit_name: unit_name.into(),
            mission_description: mission_description.into(),
            report_text,
        });
    }

    /// 汇总最终报告
    pub fn compile(&mut self) -> &str {
        let report = match &self.error {
            Some(e) => format!("{}: {}", MISSION_FAILED, e),
            None if self.completed_missions.is_empty() => EMPTY_PLAN.to_string(),
            None => self
                .completed_missions
                .iter()
                .map(CompletedMission::render)
                .collect::<Vec<_>>()
                .join("\n"),
        };
        self.final_report.insert(report).as_str()
    }

    /// 对上级可见的部分
    pub fn report(&self) -> TierReport {
        TierReport {
            final_report: self.final_report.clone().unwrap_or_default(),
            error: self.error.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_error_wins() {
        let mut state = TierState::new("order", AppContext::default());
        state.fail(MissionError::UnknownUnit("Ghost".into()));
        state.fail(MissionError::Planning("later".into()));
        assert!(state.error.as_deref().unwrap().contains("Ghost"));
    }

    #[test]
    fn test_compile_lines_in_order() {
        let mut state = TierState::new("order", AppContext::default());
        state.record("Publishing", "publish a4", "ok");
        state.record("Moderation", "check r17", "");
        let report = state.compile().to_string();
        assert_eq!(
            report,
            "- Publishing completed 'publish a4': ok\n- Moderation completed 'check r17': No report provided."
        );
        assert_eq!(state.report().error, None);
    }

    #[test]
    fn test_compile_with_error_ignores_records() {
        let mut state = TierState::new("order", AppContext::default());
        state.record("Publishing", "publish a4", "ok");
        state.fail(MissionError::Delegation {
            unit: "Moderation".into(),
            reason: "Unit failed: boom".into(),
        });
        state.compile();
        let report = state.report();
        assert_eq!(
            report.final_report,
            "Mission failed: Delegation to Moderation failed: Unit failed: boom"
        );
        assert!(report.error.is_some());
    }

    #[test]
    fn test_empty_plan() {
        let mut state = TierState::new("order", AppContext::default());
        state.set_plan(Vec::new());
        assert_eq!(state.compile(), EMPTY_PLAN);
    }

    #[test]
    fn test_queue_is_copy_of_plan() {
        let mut state = TierState::new("order", AppContext::default());
        state.set_plan(vec![Mission::new("a", "X"), Mission::new("b", "Y")]);
        state.task_queue.pop_front();
        assert_eq!(state.plan.len(), 2);
        assert_eq!(state.task_queue.len(), 1);
    }
}
