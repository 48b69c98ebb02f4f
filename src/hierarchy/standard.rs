//! 标准编制：旅游平台的四级指挥结构
//!
//! 进程启动时自下而上构建一次（叶子 -> 第 3 层 -> 第 2 层 -> Coordinator），之后只读。
//! 各单元选用哪种模板是静态接线：
//!
//! | 第 2 层 | 模板 | 下级 |
//! |---|---|---|
//! | TouristAssistance | planner | AttractionGuide, TripAdvisory |
//! | ContentOperations | planner | Publishing, Moderation |
//! | AccountServices | supervisor | ProfileDesk |
//! | QualityAssurance | 模拟 planner | Verification |

use std::sync::Arc;

use serde_json::json;

use crate::core::EngineError;
use crate::hierarchy::coordinator::{Coordinator, COORDINATOR};
use crate::hierarchy::leaf::{LeafUnit, StaticArguments};
use crate::hierarchy::planner_unit::PlannerUnit;
use crate::hierarchy::roster::Roster;
use crate::hierarchy::supervisor::SupervisorUnit;
use crate::hierarchy::unit::Unit;
use crate::hierarchy::unit_id::UnitId;
use crate::llm::ModelRouter;
use crate::tools::ToolRegistry;

/// 叶子编队（顺序即优先级，实际只会调用第一个）
pub const SQUADS: [(UnitId, &[&str]); 6] = [
    (
        UnitId::AttractionSquad,
        &["list_published_attractions", "search_attractions"],
    ),
    (UnitId::ItinerarySquad, &["suggest_itinerary"]),
    (UnitId::PublishingSquad, &["list_drafts", "publish_content"]),
    (UnitId::ModerationSquad, &["list_flagged_content"]),
    (UnitId::ProfileSquad, &["get_profile"]),
    (
        UnitId::VerificationSquad,
        &["list_pending_verifications", "score_submission"],
    ),
];

fn leaf(id: UnitId, tools: &ToolRegistry) -> Result<Arc<dyn Unit>, EngineError> {
    let names = SQUADS
        .iter()
        .find(|(squad, _)| *squad == id)
        .map(|(_, names)| *names)
        .unwrap_or_default();
    let unit = LeafUnit::from_registry(id, tools, names)?;
    let unit = match id {
        UnitId::ItinerarySquad => {
            unit.with_arguments(StaticArguments::new().with("suggest_itinerary", json!({ "days": 2 })))
        }
        _ => unit,
    };
    Ok(Arc::new(unit))
}

fn supervisor(id: UnitId, child_id: UnitId, child: Arc<dyn Unit>) -> Arc<dyn Unit> {
    Arc::new(SupervisorUnit::new(id, child_id, child))
}

/// 第 2 层编制（Coordinator 的下级）
pub fn build_roster(tools: &ToolRegistry, router: Arc<ModelRouter>) -> Result<Roster, EngineError> {
    // 第 3 层
    let attraction_guide = supervisor(
        UnitId::AttractionGuide,
        UnitId::AttractionSquad,
        leaf(UnitId::AttractionSquad, tools)?,
    );
    let trip_advisory: Arc<dyn Unit> = Arc::new(PlannerUnit::simulated(
        UnitId::TripAdvisory,
        UnitId::ItinerarySquad,
        Roster::new(UnitId::TripAdvisory.as_str())
            .with(UnitId::ItinerarySquad, leaf(UnitId::ItinerarySquad, tools)?),
    )?);
    let publishing = supervisor(
        UnitId::Publishing,
        UnitId::PublishingSquad,
        leaf(UnitId::PublishingSquad, tools)?,
    );
    let moderation = supervisor(
        UnitId::Moderation,
        UnitId::ModerationSquad,
        leaf(UnitId::ModerationSquad, tools)?,
    );
    let profile_desk = supervisor(
        UnitId::ProfileDesk,
        UnitId::ProfileSquad,
        leaf(UnitId::ProfileSquad, tools)?,
    );
    let verification = supervisor(
        UnitId::Verification,
        UnitId::VerificationSquad,
        leaf(UnitId::VerificationSquad, tools)?,
    );

    // 第 2 层
    let tourist_assistance = PlannerUnit::planned(
        UnitId::TouristAssistance,
        Arc::clone(&router),
        Roster::new(UnitId::TouristAssistance.as_str())
            .with(UnitId::AttractionGuide, attraction_guide)
            .with(UnitId::TripAdvisory, trip_advisory),
    );
    let content_operations = PlannerUnit::planned(
        UnitId::ContentOperations,
        Arc::clone(&router),
        Roster::new(UnitId::ContentOperations.as_str())
            .with(UnitId::Publishing, publishing)
            .with(UnitId::Moderation, moderation),
    );
    let account_services = supervisor(UnitId::AccountServices, UnitId::ProfileDesk, profile_desk);
    let quality_assurance = PlannerUnit::simulated(
        UnitId::QualityAssurance,
        UnitId::Verification,
        Roster::new(UnitId::QualityAssurance.as_str()).with(UnitId::Verification, verification),
    )?;

    Ok(Roster::new(COORDINATOR)
        .with(UnitId::TouristAssistance, Arc::new(tourist_assistance))
        .with(UnitId::ContentOperations, Arc::new(content_operations))
        .with(UnitId::AccountServices, account_services)
        .with(UnitId::QualityAssurance, Arc::new(quality_assurance)))
}

/// 构建完整层级，返回入口 Coordinator
pub fn build_coordinator(tools: &ToolRegistry, router: Arc<ModelRouter>) -> Result<Coordinator, EngineError> {
    let roster = build_roster(tools, Arc::clone(&router))?;
    tracing::info!(
        "Hierarchy ready: {} tier-2 units, {} registered tools",
        roster.len(),
        tools.len()
    );
    Ok(Coordinator::new(router, roster))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::AppContext;
    use crate::llm::{FixedBackendFactory, RoutingSettings};
    use crate::tools::sample_registry;

    fn mock_router() -> Arc<ModelRouter> {
        Arc::new(ModelRouter::new(
            RoutingSettings::default(),
            Arc::new(FixedBackendFactory::mock()),
        ))
    }

    #[test]
    fn test_every_tier2_unit_is_wired() {
        let roster = build_roster(&sample_registry(), mock_router()).unwrap();
        assert_eq!(roster.owner(), COORDINATOR);
        let ids: Vec<_> = roster.entries().iter().map(|e| e.id).collect();
        assert_eq!(
            ids,
            vec![
                UnitId::TouristAssistance,
                UnitId::ContentOperations,
                UnitId::AccountServices,
                UnitId::QualityAssurance,
            ]
        );
    }

    #[test]
    fn test_missing_tool_is_construction_error() {
        let err = build_coordinator(&ToolRegistry::new(), mock_router()).err().unwrap();
        assert!(matches!(err, EngineError::MissingTool(_)));
    }

    #[tokio::test]
    async fn test_mock_backend_runs_end_to_end() {
        let coordinator = build_coordinator(&sample_registry(), mock_router()).unwrap();
        let outcome = coordinator
            .handle("list all published attractions", &AppContext::user("u1"), &[])
            .await;

        assert!(outcome.is_ok(), "{:?}", outcome.error);
        assert!(outcome.final_report.contains("TouristAssistance completed"));
        assert!(outcome.final_report.contains("AttractionSquad | list_published_attractions"));
        assert!(outcome.final_report.contains("Charles Bridge"));
    }
}
