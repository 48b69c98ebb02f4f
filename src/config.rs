//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `ECHELON__*` 覆盖（双下划线表示嵌套，如 `ECHELON__ROUTING__TOKEN_THRESHOLD=2000`）。

use std::path::PathBuf;

use serde::Deserialize;

use crate::core::EngineError;

/// 路由阈值的硬编码兜底值（配置不可用时使用）
pub const DEFAULT_TOKEN_THRESHOLD: usize = 1500;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub routing: RoutingSection,
    #[serde(default)]
    pub llm: LlmSection,
}

/// [app] 段：应用名
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppSection {
    pub name: Option<String>,
}

/// [routing] 段：本地 / 远程后端切换阈值
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingSection {
    /// 历史 + prompt 的 token 总数超过该值时优先走远程大模型
    #[serde(default = "default_token_threshold")]
    pub token_threshold: usize,
}

fn default_token_threshold() -> usize {
    DEFAULT_TOKEN_THRESHOLD
}

impl Default for RoutingSection {
    fn default() -> Self {
        Self {
            token_threshold: default_token_threshold(),
        }
    }
}

/// [llm] 段：本地小模型与远程大模型
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LlmSection {
    #[serde(default)]
    pub local: LlmLocalSection,
    #[serde(default)]
    pub remote: LlmRemoteSection,
}

/// [llm.local] 段：OpenAI 兼容的本地推理服务（如 Ollama）
#[derive(Debug, Clone, Deserialize)]
pub struct LlmLocalSection {
    #[serde(default = "default_local_base_url")]
    pub base_url: String,
    #[serde(default = "default_local_model")]
    pub model: String,
}

fn default_local_base_url() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_local_model() -> String {
    "llama3.1".to_string()
}

impl Default for LlmLocalSection {
    fn default() -> Self {
        Self {
            base_url: default_local_base_url(),
            model: default_local_model(),
        }
    }
}

/// [llm.remote] 段：远程后端（deepseek / openai），api_key 未配置时回退到环境变量
#[derive(Debug, Clone, Deserialize)]
pub struct LlmRemoteSection {
    #[serde(default = "default_remote_provider")]
    pub provider: String,
    pub model: Option<String>,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

fn default_remote_provider() -> String {
    "deepseek".to_string()
}

impl Default for LlmRemoteSection {
    fn default() -> Self {
        Self {
            provider: default_remote_provider(),
            model: None,
            base_url: None,
            api_key: None,
        }
    }
}

impl LlmRemoteSection {
    /// 系统级远程凭据：配置项优先，其次 DEEPSEEK_API_KEY / OPENAI_API_KEY
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| std::env::var("DEEPSEEK_API_KEY").ok())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.trim().is_empty())
    }
}

/// 从 config 目录加载配置，环境变量 ECHELON__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 ECHELON__*（双下划线表示嵌套键）
///
/// 文件无法解析或字段类型不符时返回 `EngineError::ConfigError`。
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, EngineError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("ECHELON")
            .separator("__")
            .try_parsing(true),
    );

    let c = builder.build()?;
    Ok(c.try_deserialize()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::RoutingSettings;
    use std::io::Write;
    use std::sync::Mutex;

    /// 读写进程环境变量的测试串行执行
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        write!(file, "{}", contents).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.routing.token_threshold, 1500);
        assert_eq!(cfg.llm.remote.provider, "deepseek");
        assert_eq!(cfg.llm.local.base_url, "http://localhost:11434/v1");
    }

    #[test]
    fn test_load_from_explicit_file() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let file = toml_file(
            "[routing]\ntoken_threshold = 4096\n\n[llm.remote]\nprovider = \"openai\"\nmodel = \"gpt-4o\"\n",
        );

        let cfg = load_config(Some(file.path().to_path_buf())).unwrap();
        assert_eq!(cfg.routing.token_threshold, 4096);
        assert_eq!(cfg.llm.remote.provider, "openai");
        assert_eq!(cfg.llm.remote.model.as_deref(), Some("gpt-4o"));
        // 未出现的段落仍取默认值
        assert_eq!(cfg.llm.local.model, "llama3.1");
    }

    #[test]
    fn test_configured_api_key_wins() {
        let remote = LlmRemoteSection {
            api_key: Some("sk-config".to_string()),
            ..Default::default()
        };
        assert_eq!(remote.resolve_api_key().as_deref(), Some("sk-config"));
    }

    #[test]
    fn test_env_overrides_threshold() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let file = toml_file("[routing]\ntoken_threshold = 4096\n");
        std::env::set_var("ECHELON__ROUTING__TOKEN_THRESHOLD", "2048");
        let cfg = load_config(Some(file.path().to_path_buf()));
        std::env::remove_var("ECHELON__ROUTING__TOKEN_THRESHOLD");

        assert_eq!(cfg.unwrap().routing.token_threshold, 2048);
    }

    #[test]
    fn test_malformed_file_falls_back_to_default_threshold() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let file = toml_file("[routing\ntoken_threshold = \n");

        let err = load_config(Some(file.path().to_path_buf())).unwrap_err();
        assert!(matches!(err, EngineError::ConfigError(_)));

        let settings = RoutingSettings::load_from(Some(file.path().to_path_buf()));
        assert_eq!(settings.token_threshold, DEFAULT_TOKEN_THRESHOLD);
    }

    #[test]
    fn test_wrong_type_is_config_error() {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let file = toml_file("[routing]\ntoken_threshold = \"lots\"\n");

        let err = load_config(Some(file.path().to_path_buf())).unwrap_err();
        assert!(err.to_string().starts_with("Config error:"));
    }
}
