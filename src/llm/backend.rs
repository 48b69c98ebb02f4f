//! 推理后端目标与客户端工厂
//!
//! 路由层只决定“用哪个后端”（BackendTarget），具体客户端由 BackendFactory 构造，
//! 测试中可替换为记录型工厂。
//! - DeepSeek: https://api.deepseek.com，deepseek-chat
//! - OpenAI: 默认端点，gpt-4o-mini
//! - 本地（ollama / local）：配置中的 OpenAI 兼容端点

use std::sync::{Arc, Mutex};

use crate::llm::{LlmClient, MockLlmClient, OpenAiClient};

pub const DEEPSEEK_BASE_URL: &str = "https://api.deepseek.com";
pub const DEEPSEEK_CHAT: &str = "deepseek-chat";
pub const OPENAI_DEFAULT_MODEL: &str = "gpt-4o-mini";

/// 后端类别：本地小模型 / 远程大模型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    Local,
    Remote,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BackendKind::Local => write!(f, "local"),
            BackendKind::Remote => write!(f, "remote"),
        }
    }
}

/// 选定的后端：provider、模型、端点与凭据
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendTarget {
    pub kind: BackendKind,
    pub provider: String,
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

/// provider 是否指本地推理服务
pub fn is_local_provider(provider: &str) -> bool {
    matches!(provider.to_lowercase().as_str(), "ollama" | "local")
}

/// 已知远程 provider 的默认端点；None 表示使用 OpenAI 默认端点
pub fn provider_base_url(provider: &str) -> Option<&'static str> {
    match provider.to_lowercase().as_str() {
        "deepseek" => Some(DEEPSEEK_BASE_URL),
        _ => None,
    }
}

/// 已知远程 provider 的默认模型
pub fn provider_default_model(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "deepseek" => DEEPSEEK_CHAT,
        _ => OPENAI_DEFAULT_MODEL,
    }
}

/// 根据目标构造 LLM 客户端
pub trait BackendFactory: Send + Sync {
    fn client_for(&self, target: &BackendTarget) -> Arc<dyn LlmClient>;
}

/// 默认工厂：所有目标都走 OpenAI 兼容客户端
#[derive(Debug, Default)]
pub struct OpenAiBackendFactory;

impl BackendFactory for OpenAiBackendFactory {
    fn client_for(&self, target: &BackendTarget) -> Arc<dyn LlmClient> {
        Arc::new(OpenAiClient::new(
            target.base_url.as_deref(),
            &target.model,
            target.api_key.as_deref(),
        ))
    }
}

/// 固定客户端工厂：任何目标都返回同一个客户端，并记录每次选中的目标
/// （无 API Key 时配合 MockLlmClient 运行，测试中用于断言路由结果）
pub struct FixedBackendFactory {
    client: Arc<dyn LlmClient>,
    targets: Mutex<Vec<BackendTarget>>,
}

impl FixedBackendFactory {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self {
            client,
            targets: Mutex::new(Vec::new()),
        }
    }

    pub fn mock() -> Self {
        Self::new(Arc::new(MockLlmClient))
    }

    /// 迄今为止选中的目标（按调用顺序）
    pub fn targets(&self) -> Vec<BackendTarget> {
        self.targets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }
}

impl BackendFactory for FixedBackendFactory {
    fn client_for(&self, target: &BackendTarget) -> Arc<dyn LlmClient> {
        self.targets
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(target.clone());
        Arc::clone(&self.client)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_defaults() {
        assert_eq!(provider_base_url("DeepSeek"), Some(DEEPSEEK_BASE_URL));
        assert_eq!(provider_base_url("openai"), None);
        assert_eq!(provider_default_model("deepseek"), DEEPSEEK_CHAT);
        assert_eq!(provider_default_model("anthropic-proxy"), OPENAI_DEFAULT_MODEL);
    }

    #[test]
    fn test_local_provider_names() {
        assert!(is_local_provider("Ollama"));
        assert!(is_local_provider("local"));
        assert!(!is_local_provider("openai"));
    }
}
