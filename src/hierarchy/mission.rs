//! Mission 与 Plan 解析
//!
//! 模型输出应为 `{"missions": [{"description": ..., "responsible_unit": ...}]}`；
//! 解析时容忍 ```json 代码块与前后说明文字，也接受裸数组。

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::core::MissionError;

/// 一条委派任务；由 planner 产生后不可变
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Mission {
    /// 交给下级的指令文本
    pub description: String,
    /// 负责单元名（须在本层编制内）
    pub responsible_unit: String,
}

impl Mission {
    pub fn new(description: impl Into<String>, responsible_unit: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            responsible_unit: responsible_unit.into(),
        }
    }
}

/// 模型需要返回的计划载荷
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PlanPayload {
    /// 按执行顺序排列的任务
    pub missions: Vec<Mission>,
}

/// 计划载荷的 JSON Schema，嵌入 planner prompt
pub fn plan_schema_json() -> String {
    let schema = schemars::schema_for!(PlanPayload);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

fn extract_json(text: &str) -> &str {
    let trimmed = text.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        return rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim());
    }
    // 先出现的括号决定载荷形状：裸数组或对象
    let (open, close) = match (trimmed.find('['), trimmed.find('{')) {
        (Some(a), Some(o)) if a < o => ('[', ']'),
        (Some(_), None) => ('[', ']'),
        _ => ('{', '}'),
    };
    match (trimmed.find(open), trimmed.rfind(close)) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    }
}

/// 把模型回复解析为 Plan；失败即规划错误（不重试）
pub fn parse_plan(output: &str) -> Result<Vec<Mission>, MissionError> {
    let json_str = extract_json(output);
    if json_str.starts_with('[') {
        return serde_json::from_str::<Vec<Mission>>(json_str)
            .map_err(|e| MissionError::InvalidPlan(e.to_string()));
    }
    serde_json::from_str::<PlanPayload>(json_str)
        .map(|p| p.missions)
        .map_err(|e| MissionError::InvalidPlan(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_plain_payload() {
        let plan = parse_plan(
            r#"{"missions":[{"description":"list attractions","responsible_unit":"TouristAssistance"}]}"#,
        )
        .unwrap();
        assert_eq!(plan, vec![Mission::new("list attractions", "TouristAssistance")]);
    }

    #[test]
    fn test_parse_fenced_payload_with_prose() {
        let text = "Here is the plan:\n```json\n{\"missions\": [\
            {\"description\": \"a\", \"responsible_unit\": \"Publishing\"},\
            {\"description\": \"b\", \"responsible_unit\": \"Moderation\"}]}\n```\nDone.";
        let plan = parse_plan(text).unwrap();
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].responsible_unit, "Moderation");
    }

    #[test]
    fn test_parse_bare_array() {
        let plan = parse_plan(r#"[{"description":"x","responsible_unit":"ProfileDesk"}]"#).unwrap();
        assert_eq!(plan[0].description, "x");
    }

    #[test]
    fn test_not_json_is_invalid_plan() {
        let err = parse_plan("not json").unwrap_err();
        assert!(matches!(err, MissionError::InvalidPlan(_)));
        assert!(err.to_string().contains("invalid JSON"));

        let err = parse_plan("Error: connection refused").unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_schema_mentions_fields() {
        let schema = plan_schema_json();
        assert!(schema.contains("missions"));
        assert!(schema.contains("responsible_unit"));
    }

    #[test]
    fn test_parse_array_after_prose() {
        let plan = parse_plan(
            r#"Here is the plan: [{"description":"publish the draft","responsible_unit":"Publishing"},{"description":"review flags","responsible_unit":"Moderation"}] Let me know."#,
        )
        .unwrap();
        assert_eq!(
            plan,
            vec![
                Mission::new("publish the draft", "Publishing"),
                Mission::new("review flags", "Moderation"),
            ]
        );
    }

    #[test]
    fn test_object_wins_when_it_comes_first() {
        let plan = parse_plan(
            r#"Plan: {"missions":[{"description":"score it","responsible_unit":"Verification"}]}"#,
        )
        .unwrap();
        assert_eq!(plan[0].responsible_unit, "Verification");
    }
}
