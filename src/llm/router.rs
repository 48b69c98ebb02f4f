//! 模型路由层：在本地小模型与远程大模型之间选择
//!
//! 仅供各层 planner 节点调用，本身不再向下委派。决策顺序：
//! 1. 调用方指定了非默认 provider 且带凭据：无条件使用之
//! 2. 计算 token 总数（历史 + prompt），与配置阈值比较
//! 3. prompt 命中复杂任务关键词即视为复杂
//! 4. 超阈值或复杂 -> 远程；否则本地
//! 5. 需要远程但没有任何凭据 -> 回退本地，而不是让请求失败
//!
//! 后端调用失败时 invoke 把错误文本作为普通回复返回，由 planner 当作（无法解析的）模型输出处理。

use std::path::PathBuf;
use std::sync::Arc;

use crate::config::{load_config, AppConfig, LlmLocalSection, LlmRemoteSection, DEFAULT_TOKEN_THRESHOLD};
use crate::context::AppContext;
use crate::llm::backend::{
    is_local_provider, provider_base_url, provider_default_model, BackendFactory, BackendKind,
    BackendTarget,
};
use crate::memory::{count_tokens, render_history, Message, SegmentingCounter, TokenCounter};

/// 复杂任务关键词（子串匹配，不区分大小写）
pub const COMPLEXITY_KEYWORDS: [&str; 6] = [
    "analyze",
    "summarize",
    "explain",
    "evaluate",
    "generate a report",
    "create a plan",
];

/// 复杂度判定器
pub struct TaskClassifier;

impl TaskClassifier {
    pub fn is_complex(prompt: &str) -> bool {
        let content_lower = prompt.to_lowercase();
        COMPLEXITY_KEYWORDS.iter().any(|k| content_lower.contains(k))
    }
}

/// 选择该后端的原因
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteReason {
    /// 调用方自带 provider + 凭据
    CallerOverride,
    /// token 总数超过阈值
    TokenThreshold,
    /// prompt 命中复杂任务关键词
    ComplexityKeyword,
    /// 短且简单
    Simple,
    /// 想走远程但没有凭据
    MissingRemoteCredential,
}

/// 一次路由决策
#[derive(Debug, Clone)]
pub struct RoutingDecision {
    pub target: BackendTarget,
    pub reason: RouteReason,
    pub total_tokens: usize,
    pub is_complex: bool,
}

/// 路由配置：阈值、本地端点、远程 provider 与系统级凭据
#[derive(Debug, Clone)]
pub struct RoutingSettings {
    pub token_threshold: usize,
    pub local: LlmLocalSection,
    pub remote: LlmRemoteSection,
    /// 系统级远程凭据（配置或环境变量）
    pub remote_api_key: Option<String>,
}

impl Default for RoutingSettings {
    fn default() -> Self {
        Self {
            token_threshold: DEFAULT_TOKEN_THRESHOLD,
            local: LlmLocalSection::default(),
            remote: LlmRemoteSection::default(),
            remote_api_key: None,
        }
    }
}

impl RoutingSettings {
    pub fn from_config(cfg: &AppConfig) -> Self {
        Self {
            token_threshold: cfg.routing.token_threshold,
            local: cfg.llm.local.clone(),
            remote: cfg.llm.remote.clone(),
            remote_api_key: cfg.llm.remote.resolve_api_key(),
        }
    }

    /// 从系统配置加载；配置不可用时使用硬编码阈值
    pub fn load() -> Self {
        Self::load_from(None)
    }

    /// 同 load，额外叠加 config_path 指定的文件
    pub fn load_from(config_path: Option<PathBuf>) -> Self {
        match load_config(config_path) {
            Ok(cfg) => Self::from_config(&cfg),
            Err(e) => {
                tracing::warn!(
                    "Routing config unavailable ({}), using default threshold {}",
                    e,
                    DEFAULT_TOKEN_THRESHOLD
                );
                Self::from_config(&AppConfig::default())
            }
        }
    }

    pub fn with_token_threshold(mut self, threshold: usize) -> Self {
        self.token_threshold = threshold;
        self
    }

    pub fn with_remote_api_key(mut self, key: impl Into<String>) -> Self {
        self.remote_api_key = Some(key.into());
        self
    }
}

/// 模型路由器：进程启动时构建一次，各 planner 共享（只读）
pub struct ModelRouter {
    settings: RoutingSettings,
    counter: Box<dyn TokenCounter>,
    factory: Arc<dyn BackendFactory>,
}

impl ModelRouter {
    pub fn new(settings: RoutingSettings, factory: Arc<dyn BackendFactory>) -> Self {
        Self {
            settings,
            counter: Box::new(SegmentingCounter),
            factory,
        }
    }

    /// 替换 token 计数器
    pub fn with_counter(mut self, counter: impl TokenCounter + 'static) -> Self {
        self.counter = Box::new(counter);
        self
    }

    /// 只做决策，不调用后端
    pub fn route(&self, prompt: &str, history: &[Message], ctx: &AppContext) -> RoutingDecision {
        let history_text = render_history(history);
        let combined = if history_text.is_empty() {
            prompt.to_string()
        } else {
            format!("{}\n{}", history_text, prompt)
        };
        let total_tokens = count_tokens(self.counter.as_ref(), &combined);
        let is_complex = TaskClassifier::is_complex(prompt);

        let decide = |target: BackendTarget, reason: RouteReason| RoutingDecision {
            target,
            reason,
            total_tokens,
            is_complex,
        };

        if let (Some(provider), Some(key)) = (ctx.custom_provider(), ctx.credential()) {
            return decide(
                self.caller_target(provider, key),
                RouteReason::CallerOverride,
            );
        }

        let over_threshold = total_tokens > self.settings.token_threshold;
        if !(over_threshold || is_complex) {
            return decide(self.local_target(), RouteReason::Simple);
        }

        let key = ctx
            .credential()
            .map(String::from)
            .or_else(|| self.settings.remote_api_key.clone());
        match key {
            Some(key) => {
                let reason = if over_threshold {
                    RouteReason::TokenThreshold
                } else {
                    RouteReason::ComplexityKeyword
                };
                decide(self.remote_target(key), reason)
            }
            None => decide(self.local_target(), RouteReason::MissingRemoteCredential),
        }
    }

    /// 路由并调用选中的后端；后端错误以内联文本返回
    pub async fn invoke(&self, prompt: &str, history: &[Message], ctx: &AppContext) -> String {
        let decision = self.route(prompt, history, ctx);
        tracing::info!(
            backend = %decision.target.kind,
            provider = %decision.target.provider,
            model = %decision.target.model,
            reason = ?decision.reason,
            total_tokens = decision.total_tokens,
            "model routed"
        );

        let client = self.factory.client_for(&decision.target);
        let mut messages = history.to_vec();
        messages.push(Message::user(prompt));

        match client.complete(&messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("{} backend call failed: {}", decision.target.kind, e);
                format!("Error: {}", e)
            }
        }
    }

    fn local_target(&self) -> BackendTarget {
        BackendTarget {
            kind: BackendKind::Local,
            provider: "local".to_string(),
            model: self.settings.local.model.clone(),
            base_url: Some(self.settings.local.base_url.clone()),
            api_key: None,
        }
    }

    fn remote_target(&self, api_key: String) -> BackendTarget {
        let provider = self.settings.remote.provider.clone();
        let model = self
            .settings
            .remote
            .model
            .clone()
            .unwrap_or_else(|| provider_default_model(&provider).to_string());
        let base_url = self
            .settings
            .remote
            .base_url
            .clone()
            .or_else(|| provider_base_url(&provider).map(String::from));
        BackendTarget {
            kind: BackendKind::Remote,
            provider,
            model,
            base_url,
            api_key: Some(api_key),
        }
    }

    fn caller_target(&self, provider: &str, api_key: &str) -> BackendTarget {
        if is_local_provider(provider) {
            return BackendTarget {
                api_key: Some(api_key.to_string()),
                ..self.local_target()
            };
        }
        // 与系统远程 provider 相同时沿用配置的模型和端点
        let same_as_system = provider.eq_ignore_ascii_case(&self.settings.remote.provider);
        let model = self
            .settings
            .remote
            .model
            .clone()
            .filter(|_| same_as_system)
            .unwrap_or_else(|| provider_default_model(provider).to_string());
        let base_url = self
            .settings
            .remote
            .base_url
            .clone()
            .filter(|_| same_as_system)
            .or_else(|| provider_base_url(provider).map(String::from));
        BackendTarget {
            kind: BackendKind::Remote,
            provider: provider.to_lowercase(),
            model,
            base_url,
            api_key: Some(api_key.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::FixedBackendFactory;
    use crate::memory::WhitespaceCounter;

    fn router(settings: RoutingSettings) -> ModelRouter {
        ModelRouter::new(settings, Arc::new(FixedBackendFactory::mock())).with_counter(WhitespaceCounter)
    }

    fn long_history(words: usize) -> Vec<Message> {
        vec![Message::user(vec!["word"; words].join(" "))]
    }

    #[test]
    fn test_classifier_keywords() {
        assert!(TaskClassifier::is_complex("Please ANALYZE visitor trends"));
        assert!(TaskClassifier::is_complex("generate a report on reviews"));
        assert!(!TaskClassifier::is_complex("list all published attractions"));
    }

    #[test]
    fn test_simple_prompt_goes_local() {
        let r = router(RoutingSettings::default().with_remote_api_key("sk-sys"));
        let d = r.route("list all published attractions", &[], &AppContext::user("u1"));
        assert_eq!(d.target.kind, BackendKind::Local);
        assert_eq!(d.reason, RouteReason::Simple);
        assert_eq!(d.total_tokens, 4);
    }

    #[test]
    fn test_complex_prompt_goes_remote() {
        let r = router(RoutingSettings::default().with_remote_api_key("sk-sys"));
        let d = r.route("summarize last week's bookings", &[], &AppContext::user("u1"));
        assert_eq!(d.target.kind, BackendKind::Remote);
        assert_eq!(d.reason, RouteReason::ComplexityKeyword);
        assert_eq!(d.target.provider, "deepseek");
        assert_eq!(d.target.base_url.as_deref(), Some("https://api.deepseek.com"));
        assert_eq!(d.target.api_key.as_deref(), Some("sk-sys"));
    }

    #[test]
    fn test_threshold_is_strictly_greater() {
        let r = router(
            RoutingSettings::default()
                .with_token_threshold(10)
                .with_remote_api_key("sk-sys"),
        );
        // "user:" + 8 词 + prompt 1 词 = 10，不超过阈值
        let d = r.route("hello", &long_history(8), &AppContext::user("u1"));
        assert_eq!(d.total_tokens, 10);
        assert_eq!(d.target.kind, BackendKind::Local);

        let d = r.route("hello", &long_history(9), &AppContext::user("u1"));
        assert_eq!(d.target.kind, BackendKind::Remote);
        assert_eq!(d.reason, RouteReason::TokenThreshold);
    }

    #[test]
    fn test_missing_credential_falls_back_to_local() {
        let r = router(RoutingSettings::default());
        let d = r.route("evaluate the moderation queue", &[], &AppContext::user("u1"));
        assert_eq!(d.target.kind, BackendKind::Local);
        assert_eq!(d.reason, RouteReason::MissingRemoteCredential);
    }

    #[test]
    fn test_caller_credential_enables_remote() {
        let r = router(RoutingSettings::default());
        let ctx = AppContext::user("u1").with_provider("default", "sk-caller");
        let d = r.route("explain the refund policy", &[], &ctx);
        assert_eq!(d.target.kind, BackendKind::Remote);
        assert_eq!(d.target.api_key.as_deref(), Some("sk-caller"));
    }

    #[test]
    fn test_caller_override_wins() {
        let r = router(
            RoutingSettings::default()
                .with_token_threshold(1)
                .with_remote_api_key("sk-sys"),
        );
        let ctx = AppContext::user("u1").with_provider("openai", "sk-caller");
        let d = r.route("analyze everything", &long_history(5000), &ctx);
        assert_eq!(d.reason, RouteReason::CallerOverride);
        assert_eq!(d.target.provider, "openai");
        assert_eq!(d.target.model, "gpt-4o-mini");
        assert_eq!(d.target.api_key.as_deref(), Some("sk-caller"));
    }

    #[test]
    fn test_caller_local_provider_override() {
        let r = router(RoutingSettings::default().with_remote_api_key("sk-sys"));
        let ctx = AppContext::user("u1").with_provider("ollama", "anything");
        let d = r.route("analyze everything", &[], &ctx);
        assert_eq!(d.reason, RouteReason::CallerOverride);
        assert_eq!(d.target.kind, BackendKind::Local);
    }
}
