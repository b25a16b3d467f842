//! 应用配置管理
//!
//! 配置文件 `config.json` 位于可执行文件同级目录，启动时加载一次，
//! 使用全局单例管理。

use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::error::{AppError, AppResult};
use crate::llm::ProviderKind;
use crate::services::doc_generator::DocGenConfig;

/// 获取配置文件路径
fn get_config_path() -> PathBuf {
    std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.json")
}

/// 应用配置结构体
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Provider 标识：OpenAI / Anthropic / Gemini
    #[serde(default = "default_provider")]
    pub provider: String,

    /// LLM API 密钥（为空时读取环境变量）
    #[serde(default)]
    pub api_key: String,

    /// 覆盖 Provider 的默认基础 URL
    #[serde(default)]
    pub base_url: Option<String>,

    /// 文档生成配置
    #[serde(default)]
    pub docgen: DocGenConfig,
}

fn default_provider() -> String {
    ProviderKind::Gemini.key().to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            api_key: String::new(),
            base_url: None,
            docgen: DocGenConfig::default(),
        }
    }
}

impl AppConfig {
    /// 解析 Provider 种类
    pub fn provider_kind(&self) -> AppResult<ProviderKind> {
        self.provider
            .parse()
            .map_err(|e: crate::llm::LlmError| AppError::Config(e.to_string()))
    }
}

/// 全局配置单例
static CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(load_config_from_file().unwrap_or_default())
});

/// 从文件加载配置
fn load_config_from_file() -> Option<AppConfig> {
    let path = get_config_path();
    if !path.exists() {
        debug!("No config file at {}, using defaults", path.display());
        return None;
    }

    let content = fs::read_to_string(&path).ok()?;
    match serde_json::from_str(&content) {
        Ok(config) => Some(config),
        Err(e) => {
            warn!("Ignoring invalid config file {}: {}", path.display(), e);
            None
        }
    }
}

/// 获取当前配置（克隆）
pub fn get_config() -> AppConfig {
    CONFIG.read().clone()
}

/// 获取当前 Provider 的 API 密钥
///
/// 优先使用配置文件中的 api_key，其次读取 Provider 对应的环境变量
pub fn resolve_api_key(config: &AppConfig) -> AppResult<String> {
    resolve_api_key_with(config, |name| std::env::var(name).ok())
}

/// 使用自定义环境变量查询函数获取 API 密钥
pub fn resolve_api_key_with<F>(config: &AppConfig, lookup: F) -> AppResult<String>
where
    F: Fn(&str) -> Option<String>,
{
    if !config.api_key.trim().is_empty() {
        return Ok(config.api_key.clone());
    }

    let kind = config.provider_kind()?;
    lookup(kind.api_key_env())
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| AppError::MissingApiKey {
            provider: kind.key().to_string(),
            env_var: kind.api_key_env().to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.provider, "Gemini");
        assert!(config.api_key.is_empty());
        assert!(config.base_url.is_none());
        assert_eq!(config.docgen.concurrency, 4);
        assert_eq!(config.docgen.output_dir, "Obsidian");
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig =
            serde_json::from_str(r#"{"provider":"Anthropic","docgen":{"concurrency":2}}"#).unwrap();
        assert_eq!(config.provider_kind().unwrap(), ProviderKind::Anthropic);
        assert_eq!(config.docgen.concurrency, 2);
        assert_eq!(config.docgen.output_dir, "Obsidian");
    }

    #[test]
    fn test_resolve_api_key_prefers_config() {
        let config = AppConfig {
            api_key: "from-config".to_string(),
            ..Default::default()
        };
        let key = resolve_api_key_with(&config, |_| Some("from-env".to_string())).unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn test_resolve_api_key_from_env() {
        let config = AppConfig {
            provider: "OpenAI".to_string(),
            ..Default::default()
        };
        let key = resolve_api_key_with(&config, |name| {
            (name == "OPENAI_API_KEY").then(|| "sk-env".to_string())
        })
        .unwrap();
        assert_eq!(key, "sk-env");
    }

    #[test]
    fn test_resolve_api_key_missing() {
        let config = AppConfig::default();
        let result = resolve_api_key_with(&config, |_| None);
        assert!(matches!(
            result,
            Err(AppError::MissingApiKey { env_var, .. }) if env_var == "GEMINI_API_KEY"
        ));
    }

    #[test]
    fn test_unknown_provider_is_config_error() {
        let config = AppConfig {
            provider: "Mistral".to_string(),
            ..Default::default()
        };
        assert!(matches!(resolve_api_key_with(&config, |_| None), Err(AppError::Config(_))));
    }
}
