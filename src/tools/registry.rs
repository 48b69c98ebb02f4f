//! 工具注册表
//!
//! 工具由外部数据层提供：实现 Tool trait（name / description / execute），由 ToolRegistry 按名注册与查找。
//! 叶子执行单元在构造时按名从注册表取出自己的编队。

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::context::AppContext;
use crate::core::EngineError;

/// 工具 trait：名称、描述、异步执行（args 与结果均为 JSON）
#[async_trait]
pub trait Tool: Send + Sync {
    /// 工具名称
    fn name(&self) -> &str;

    /// 工具描述
    fn description(&self) -> &str;

    /// 执行工具；ctx 为原样透传的调用方上下文，Err 为失败描述
    async fn execute(&self, args: Value, ctx: &AppContext) -> Result<Value, String>;
}

/// 工具注册表：按名称存储 Arc<dyn Tool>
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: BTreeMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: impl Tool + 'static) {
        let name = tool.name().to_string();
        self.tools.insert(name, Arc::new(tool));
    }

    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.name().to_string(), tool);
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// 按名取工具，不存在时为构造期错误
    pub fn require(&self, name: &str) -> Result<Arc<dyn Tool>, EngineError> {
        self.get(name)
            .ok_or_else(|| EngineError::MissingTool(name.to_string()))
    }

    pub fn tool_names(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}
