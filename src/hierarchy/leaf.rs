//! 叶子执行单元
//!
//! 持有非空、有序的工具编队（squad）。每次调用总是选第一个工具，参数由可替换的
//! ArgumentStrategy 构造（默认是每个工具一份固定 JSON，不解析指令文本）。
//! 每次工具调用输出结构化审计日志（JSON）。

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::context::AppContext;
use crate::core::{EngineError, MissionError, UnitError};
use crate::hierarchy::state::MISSION_FAILED;
use crate::hierarchy::unit::{TierInput, TierReport, Unit};
use crate::hierarchy::unit_id::UnitId;
use crate::tools::{Tool, ToolRegistry};

/// 工具参数构造策略
pub trait ArgumentStrategy: Send + Sync {
    fn arguments(&self, tool: &dyn Tool, order: &str, ctx: &AppContext) -> Value;
}

/// 每个工具一份固定参数，未配置的工具用 `{}`
#[derive(Debug, Clone, Default)]
pub struct StaticArguments {
    by_tool: HashMap<String, Value>,
}

impl StaticArguments {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, tool: impl Into<String>, args: Value) -> Self {
        self.by_tool.insert(tool.into(), args);
        self
    }
}

impl ArgumentStrategy for StaticArguments {
    fn arguments(&self, tool: &dyn Tool, _order: &str, _ctx: &AppContext) -> Value {
        self.by_tool
            .get(tool.name())
            .cloned()
            .unwrap_or_else(|| json!({}))
    }
}

pub struct LeafUnit {
    id: UnitId,
    squad: Vec<Arc<dyn Tool>>,
    arguments: Box<dyn ArgumentStrategy>,
}

impl std::fmt::Debug for LeafUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeafUnit")
            .field("id", &self.id)
            .field("squad", &self.squad_names())
            .finish()
    }
}

impl LeafUnit {
    /// 空编队在构造时即拒绝
    pub fn new(id: UnitId, squad: Vec<Arc<dyn Tool>>) -> Result<Self, EngineError> {
        if squad.is_empty() {
            return Err(EngineError::EmptySquad(id.to_string()));
        }
        Ok(Self {
            id,
            squad,
            arguments: Box::new(StaticArguments::default()),
        })
    }

    /// 按名从注册表组队
    pub fn from_registry(id: UnitId, registry: &ToolRegistry, names: &[&str]) -> Result<Self, EngineError> {
        let squad = names
            .iter()
            .map(|name| registry.require(name))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(id, squad)
    }

    pub fn with_arguments(mut self, strategy: impl ArgumentStrategy + 'static) -> Self {
        self.arguments = Box::new(strategy);
        self
    }

    /// 位置选择：总是编队第一个
    pub fn selected_action(&self) -> &Arc<dyn Tool> {
        &self.squad[0]
    }

    pub fn squad_names(&self) -> Vec<&str> {
        self.squad.iter().map(|t| t.name()).collect()
    }
}

#[async_trait]
impl Unit for LeafUnit {
    fn name(&self) -> &str {
        self.id.as_str()
    }

    async fn invoke(&self, input: TierInput) -> Result<TierReport, UnitError> {
        let tool = self.selected_action();
        let args = self
            .arguments
            .arguments(tool.as_ref(), &input.order, &input.app_context);
        let preview = args_preview(&args);

        let start = Instant::now();
        let result = tool.execute(args, &input.app_context).await;
        let audit = json!({
            "event": "tool_audit",
            "squad": self.id.as_str(),
            "tool": tool.name(),
            "ok": result.is_ok(),
            "duration_ms": start.elapsed().as_millis() as u64,
            "args_preview": preview,
        });
        tracing::info!(audit = %audit.to_string(), "tool");

        match result {
            Ok(value) => Ok(TierReport::ok(format!(
                "{} | {}: {}",
                self.id,
                tool.name(),
                value
            ))),
            Err(reason) => {
                let error = MissionError::Action {
                    tool: tool.name().to_string(),
                    reason,
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

fn args_preview(args: &Value) -> String {
    let s = args.to_string();
    if s.chars().count() > 200 {
        format!("{}...", s.chars().take(200).collect::<String>())
    } else {
        s
    }
}
