//! 调用方上下文（Application Context）
//!
//! 外部数据层提供的不透明值：调用者身份、是否访客、模型提供方偏好与凭据。
//! 从 Coordinator 原样向下传递到每一层、模型路由层和叶子工具；
//! 只有模型路由层（读取 provider / api_key）和 Coordinator 的访客协议分支（读取 is_guest）会查看其内容。

use serde::{Deserialize, Serialize};

/// 表示“使用系统默认后端”的 provider 取值
pub const DEFAULT_PROVIDER: &str = "default";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppContext {
    /// 调用者标识（访客为空）
    pub user_id: Option<String>,
    /// 未登录访客
    #[serde(default)]
    pub is_guest: bool,
    /// 调用者指定的模型提供方（None 或 "default" 表示交给路由层决定）
    pub provider: Option<String>,
    /// 调用者自带的模型凭据
    pub api_key: Option<String>,
    /// 数据层附带的其他字段，引擎不解读
    #[serde(default)]
    pub extra: serde_json::Value,
}

impl AppContext {
    pub fn guest() -> Self {
        Self {
            is_guest: true,
            ..Default::default()
        }
    }

    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Default::default()
        }
    }

    pub fn with_provider(mut self, provider: impl Into<String>, api_key: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self.api_key = Some(api_key.into());
        self
    }

    /// 调用者自带的非空凭据
    pub fn credential(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }

    /// 调用者指定了非默认 provider 时返回之
    pub fn custom_provider(&self) -> Option<&str> {
        self.provider
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty() && !p.eq_ignore_ascii_case(DEFAULT_PROVIDER))
    }
}
