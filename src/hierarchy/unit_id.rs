//! 单元标识
//!
//! planner 输出的 responsible_unit 是字符串；各层编制表以 UnitId 为键，
//! 字符串只在路由节点解析一次，未知键在那里变成可恢复的 MissionError。

use std::fmt;
use std::str::FromStr;

use crate::core::EngineError;

/// 标准编制中的全部单元（第 2~4 层）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum UnitId {
    // Tier 2
    TouristAssistance,
    ContentOperations,
    AccountServices,
    QualityAssurance,
    // Tier 3
    AttractionGuide,
    TripAdvisory,
    Publishing,
    Moderation,
    ProfileDesk,
    Verification,
    // Tier 4
    AttractionSquad,
    ItinerarySquad,
    PublishingSquad,
    ModerationSquad,
    ProfileSquad,
    VerificationSquad,
}

impl UnitId {
    pub const ALL: [UnitId; 16] = [
        UnitId::TouristAssistance,
        UnitId::ContentOperations,
        UnitId::AccountServices,
        UnitId::QualityAssurance,
        UnitId::AttractionGuide,
        UnitId::TripAdvisory,
        UnitId::Publishing,
        UnitId::Moderation,
        UnitId::ProfileDesk,
        UnitId::Verification,
        UnitId::AttractionSquad,
        UnitId::ItinerarySquad,
        UnitId::PublishingSquad,
        UnitId::ModerationSquad,
        UnitId::ProfileSquad,
        UnitId::VerificationSquad,
    ];

    /// planner 使用的字符串键
    pub fn as_str(&self) -> &'static str {
        match self {
            UnitId::TouristAssistance => "TouristAssistance",
            UnitId::ContentOperations => "ContentOperations",
            UnitId::AccountServices => "AccountServices",
            UnitId::QualityAssurance => "QualityAssurance",
            UnitId::AttractionGuide => "AttractionGuide",
            UnitId::TripAdvisory => "TripAdvisory",
            UnitId::Publishing => "Publishing",
            UnitId::Moderation => "Moderation",
            UnitId::ProfileDesk => "ProfileDesk",
            UnitId::Verification => "Verification",
            UnitId::AttractionSquad => "AttractionSquad",
            UnitId::ItinerarySquad => "ItinerarySquad",
            UnitId::PublishingSquad => "PublishingSquad",
            UnitId::ModerationSquad => "ModerationSquad",
            UnitId::ProfileSquad => "ProfileSquad",
            UnitId::VerificationSquad => "VerificationSquad",
        }
    }

    /// 写进上级 planner prompt 的专长描述
    pub fn specialty(&self) -> &'static str {
        match self {
            UnitId::TouristAssistance => "questions from visitors about attractions and trips",
            UnitId::ContentOperations => "drafting, publishing and moderating platform content",
            UnitId::AccountServices => "user profiles and account questions",
            UnitId::QualityAssurance => "verification and scoring of submitted evidence",
            UnitId::AttractionGuide => "finding and describing published attractions",
            UnitId::TripAdvisory => "building multi-day itineraries",
            UnitId::Publishing => "reviewing drafts and publishing content",
            UnitId::Moderation => "reviewing flagged reviews and comments",
            UnitId::ProfileDesk => "reading user profiles",
            UnitId::Verification => "checking pending verification submissions",
            UnitId::AttractionSquad => "attraction catalog actions",
            UnitId::ItinerarySquad => "itinerary actions",
            UnitId::PublishingSquad => "publishing actions",
            UnitId::ModerationSquad => "moderation actions",
            UnitId::ProfileSquad => "profile actions",
            UnitId::VerificationSquad => "verification actions",
        }
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .flat_map(char::to_lowercase)
        .collect()
}

/// 解析 planner 输出的单元名：忽略大小写、下划线、连字符与空格
impl FromStr for UnitId {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize(s);
        if wanted.is_empty() {
            return Err(EngineError::UnknownUnit(s.to_string()));
        }
        UnitId::ALL
            .iter()
            .copied()
            .find(|id| normalize(id.as_str()) == wanted)
            .ok_or_else(|| EngineError::UnknownUnit(s.to_string()))
    }
}
