//! supervisor 模式：无规划、无队列、不调用模型
//!
//! 无条件调用唯一的固定下级，直接返回它的报告；下级调用失败时返回包装后的失败文本。

use std::sync::Arc;

use async_trait::async_trait;

use crate::core::{EngineError, MissionError, UnitError};
use crate::hierarchy::roster::Roster;
use crate::hierarchy::state::{MISSION_FAILED, NO_REPORT};
use crate::hierarchy::unit::{TierInput, TierReport, Unit};
use crate::hierarchy::unit_id::UnitId;

pub struct SupervisorUnit {
    id: UnitId,
    child_id: UnitId,
    child: Arc<dyn Unit>,
}

impl SupervisorUnit {
    pub fn new(id: UnitId, child_id: UnitId, child: Arc<dyn Unit>) -> Self {
        Self { id, child_id, child }
    }

    /// 从编制表取下级；不在编制内即构造错误
    pub fn from_roster(id: UnitId, roster: &Roster, child_id: UnitId) -> Result<Self, EngineError> {
        let child = roster.get(child_id).ok_or_else(|| EngineError::MissingChild {
            tier: id.to_string(),
            unit: child_id.to_string(),
        })?;
        Ok(Self::new(id, child_id, child))
    }
}

#[async_trait]
impl Unit for SupervisorUnit {
    fn name(&self) -> &str {
        self.id.as_str()
    }

    async fn invoke(&self, input: TierInput) -> Result<TierReport, UnitError> {
        tracing::debug!("{} passing order to {}", self.id, self.child_id);
        let child_input = TierInput::new(input.order, input.app_context);
        match self.child.invoke(child_input).await {
            Ok(report) if report.final_report.trim().is_empty() => Ok(TierReport::ok(NO_REPORT)),
            Ok(report) => Ok(TierReport::ok(report.final_report)),
            Err(e) => {
                let error = MissionError::Delegation {
                    unit: self.child_id.to_string(),
                    reason: e.to_string(),
                }
                .to_string();
                tracing::warn!("{} {}", self.id, error);
                Ok(TierReport {
                    final_report: format!("{}: {}", MISSION_FAILED, error),
                    error: Some(error),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;

    struct Fixed(Result<&'static str, &'static str>);

    #[async_trait]
    impl Unit for Fixed {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn invoke(&self, _input: TierInput) -> Result<TierReport, UnitError> {
            self.0
                .map(TierReport::ok)
                .map_err(|e| UnitError::Failed(e.to_string()))
        }
    }

    #[tokio::test]
    async fn test_passes_child_report_through() {
        let unit = SupervisorUnit::new(UnitId::ProfileDesk, UnitId::ProfileSquad, Arc::new(Fixed(Ok("profile u1"))));
        let report = unit.invoke(TierInput::new("show my profile", AppContext::default())).await.unwrap();
        assert_eq!(report, TierReport::ok("profile u1"));
    }

    #[tokio::test]
    async fn test_wraps_child_failure() {
        let unit = SupervisorUnit::new(UnitId::ProfileDesk, UnitId::ProfileSquad, Arc::new(Fixed(Err("offline"))));
        let report = unit.invoke(TierInput::new("show my profile", AppContext::default())).await.unwrap();
        assert_eq!(
            report.final_report,
            "Mission failed: Delegation to ProfileSquad failed: Unit failed: offline"
        );
        assert!(report.error.is_some());
    }

    #[test]
    fn test_from_roster_requires_child() {
        let roster = Roster::new("ProfileDesk");
        assert!(SupervisorUnit::from_roster(UnitId::ProfileDesk, &roster, UnitId::ProfileSquad).is_err());
    }
}
