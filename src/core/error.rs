//! 引擎错误类型
//!
//! - EngineError：构造期 / 配置期错误（空编队、缺工具等），以 Result 返回给调用方
//! - MissionError：运行期三类错误（规划 / 路由 / 委派），其 Display 文本即写入 TierState.error 的字符串
//! - UnitError：`Unit::invoke` 的错误契约；内置单元把失败写进报告，外部注入的单元可直接返回它（上级记为委派失败）

use thiserror::Error;

/// 构造期错误：在进程启动编制层级时即暴露，不会进入运行期
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Squad '{0}' has no actions")]
    EmptySquad(String),

    #[error("Tool not registered: {0}")]
    MissingTool(String),

    #[error("Unknown unit: {0}")]
    UnknownUnit(String),

    #[error("Roster for '{tier}' has no unit {unit}")]
    MissingChild { tier: String, unit: String },

    #[error("Config error: {0}")]
    ConfigError(String),
}

impl From<config::ConfigError> for EngineError {
    fn from(e: config::ConfigError) -> Self {
        EngineError::ConfigError(e.to_string())
    }
}

/// 运行期错误：只以字符串形式存入 error 哨兵，不向调用方抛出
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MissionError {
    /// 模型返回无法解析的计划
    #[error("Planning failed: model returned invalid JSON ({0})")]
    InvalidPlan(String),

    /// 规划阶段的其他失败
    #[error("Planning failed: {0}")]
    Planning(String),

    /// 任务指定的 responsible_unit 不在本层编制内
    #[error("No unit found for responsible_unit '{0}'")]
    UnknownUnit(String),

    /// 子单元调用失败
    #[error("Delegation to {unit} failed: {reason}")]
    Delegation { unit: String, reason: String },

    /// 叶子工具调用失败
    #[error("Action '{tool}' failed: {reason}")]
    Action { tool: String, reason: String },
}

/// 子单元调用失败
#[derive(Error, Debug, Clone)]
pub enum UnitError {
    #[error("Unit failed: {0}")]
    Failed(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mission_error_messages() {
        let e = MissionError::InvalidPlan("expected value at line 1 column 1".into());
        assert!(e.to_string().contains("invalid JSON"));

        let e = MissionError::UnknownUnit("Ghost".into());
        assert!(e.to_string().contains("Ghost"));

        let e = MissionError::Delegation {
            unit: "Publishing".into(),
            reason: "boom".into(),
        };
        assert_eq!(e.to_string(), "Delegation to Publishing failed: boom");
    }

    #[test]
    fn test_config_error_is_wrapped() {
        let e = EngineError::from(config::ConfigError::Message("bad toml".into()));
        assert!(matches!(e, EngineError::ConfigError(_)));
        assert_eq!(e.to_string(), "Config error: bad toml");
    }

    #[test]
    fn test_engine_error_empty_squad() {
        let e = EngineError::EmptySquad("AttractionSquad".into());
        assert_eq!(e.to_string(), "Squad 'AttractionSquad' has no actions");
    }
}
