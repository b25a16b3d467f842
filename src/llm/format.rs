//! Provider 标识解析和 URL 构建工具

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::types::LlmError;

/// Provider 种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProviderKind {
    /// OpenAI Chat Completions API
    OpenAi,
    /// Anthropic Messages API
    Anthropic,
    /// Gemini 的 OpenAI 兼容层
    Gemini,
}

impl ProviderKind {
    /// 配置文件和提示中使用的标识
    pub fn key(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OpenAI",
            ProviderKind::Anthropic => "Anthropic",
            ProviderKind::Gemini => "Gemini",
        }
    }

    pub fn all() -> [ProviderKind; 3] {
        [ProviderKind::OpenAi, ProviderKind::Anthropic, ProviderKind::Gemini]
    }

    /// 默认基础 URL
    pub fn default_base_url(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "https://api.openai.com/v1",
            ProviderKind::Anthropic => "https://api.anthropic.com/v1",
            ProviderKind::Gemini => "https://generativelanguage.googleapis.com/v1beta/openai",
        }
    }

    /// 读取 API 密钥的环境变量名
    pub fn api_key_env(&self) -> &'static str {
        match self {
            ProviderKind::OpenAi => "OPENAI_API_KEY",
            ProviderKind::Anthropic => "ANTHROPIC_API_KEY",
            ProviderKind::Gemini => "GEMINI_API_KEY",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .into_iter()
            .find(|kind| kind.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| LlmError::UnsupportedProvider(s.to_string()))
    }
}

/// 修复 base_url
///
/// - 移除末尾斜杠
/// - 修复双斜杠（保留协议部分）
pub fn fix_base_url(base_url: &str) -> String {
    let mut url = base_url.trim_end_matches('/').to_string();

    if let Some(pos) = url.find("://") {
        let (protocol, rest) = url.split_at(pos + 3);
        let fixed_rest = rest.replace("//", "/");
        url = format!("{}{}", protocol, fixed_rest);
    }

    url
}

/// 以 `/v1` 或 `/openai` 结尾的地址视为已带版本前缀
fn versioned_base(base_url: &str) -> String {
    let url = fix_base_url(base_url);
    if url.ends_with("/v1") || url.ends_with("/openai") {
        url
    } else {
        format!("{}/v1", url)
    }
}

/// 构建 OpenAI Chat Completions 端点
pub fn build_openai_endpoint(base_url: &str) -> String {
    let url = fix_base_url(base_url);

    if url.ends_with("/chat/completions") {
        url
    } else {
        format!("{}/chat/completions", versioned_base(&url))
    }
}

/// 构建 Anthropic Messages 端点
pub fn build_anthropic_endpoint(base_url: &str) -> String {
    let url = fix_base_url(base_url);

    if url.ends_with("/messages") {
        url
    } else {
        format!("{}/messages", versioned_base(&url))
    }
}

/// 构建模型列表端点（两种协议相同）
pub fn build_models_endpoint(base_url: &str) -> String {
    let url = fix_base_url(base_url);

    if url.ends_with("/models") {
        url
    } else {
        format!("{}/models", versioned_base(&url))
    }
}
