//! Echelon - 分层任务委派引擎
//!
//! 用户的自然语言指令自上而下逐级拆解（Coordinator → 中层单元 → 下层单元 → 执行单元），
//! 直到每个子任务落到一个确定性的工具调用；结果再自下而上汇总成可读报告。
//!
//! 模块划分：
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **context**: 调用方上下文（身份、访客标记、模型凭据），原样穿透各层
//! - **core**: 错误类型
//! - **hierarchy**: 四级指挥结构（任务、状态机、单元模板、标准编制）
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / DeepSeek / 本地 / Mock）与模型路由
//! - **memory**: 对话消息与 token 计数
//! - **observability**: 日志初始化
//! - **tools**: 工具抽象、注册表与演示数据层

pub mod config;
pub mod context;
pub mod core;
pub mod hierarchy;
pub mod llm;
pub mod memory;
pub mod observability;
pub mod tools;

pub use context::AppContext;
pub use hierarchy::{Coordinator, CoordinatorOutcome, TierReport};
