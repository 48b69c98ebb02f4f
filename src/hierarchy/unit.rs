//! 单元调用契约
//!
//! 每一层的每个单元（planner / supervisor / 模拟 planner / 叶子）都实现 Unit；
//! 上级只通过该 trait 调用下级，编制表保存 `Arc<dyn Unit>`。

use async_trait::async_trait;

use crate::context::AppContext;
use crate::core::UnitError;
use crate::memory::Message;

/// 单元输入；conversation_history 只在 Coordinator 有意义
#[derive(Debug, Clone, Default)]
pub struct TierInput {
    pub order: String,
    pub app_context: AppContext,
    pub conversation_history: Vec<Message>,
}

impl TierInput {
    pub fn new(order: impl Into<String>, app_context: AppContext) -> Self {
        Self {
            order: order.into(),
            app_context,
            conversation_history: Vec::new(),
        }
    }

    pub fn with_history(mut self, history: Vec<Message>) -> Self {
        self.conversation_history = history;
        self
    }
}

/// 单元输出：error 缺席是成功的唯一信号
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TierReport {
    pub final_report: String,
    pub error: Option<String>,
}

impl TierReport {
    pub fn ok(report: impl Into<String>) -> Self {
        Self {
            final_report: report.into(),
            error: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// 层级单元
#[async_trait]
pub trait Unit: Send + Sync {
    /// 单元名（用于日志与完成记录）
    fn name(&self) -> &str;

    /// 执行一次委派；Err 表示调用本身失败，上级会把它记为委派失败
    async fn invoke(&self, input: TierInput) -> Result<TierReport, UnitError>;
}
