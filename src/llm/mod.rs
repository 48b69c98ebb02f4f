//! LLM 层：客户端抽象与实现（OpenAI 兼容 / 本地推理服务 / Mock）以及本地-远程混合路由

pub mod backend;
pub mod mock;
pub mod openai;
pub mod router;
pub mod traits;

pub use backend::{BackendFactory, BackendKind, BackendTarget, FixedBackendFactory, OpenAiBackendFactory};
pub use mock::{MockLlmClient, ScriptedLlmClient};
pub use openai::OpenAiClient;
pub use router::{ModelRouter, RouteReason, RoutingDecision, RoutingSettings, TaskClassifier};
pub use traits::LlmClient;
