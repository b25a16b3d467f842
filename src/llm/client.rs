//! 共享 HTTP 客户端
//!
//! 各 Provider 通过组合持有 LlmClient，只在协议函数上有所区别

use reqwest::Client;
use std::time::Duration;

use super::format::fix_base_url;
use super::types::LlmError;

/// 带凭据的 HTTP 客户端
#[derive(Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// 创建新的 LLM 客户端
    ///
    /// API 密钥为空时返回 `MissingApiKey`
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, LlmError> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(LlmError::MissingApiKey);
        }

        // 文档生成的流式响应可能持续数分钟
        let http = Client::builder()
            .timeout(Duration::from_secs(600))
            .connect_timeout(Duration::from_secs(30))
            .pool_max_idle_per_host(5)
            .build()
            .map_err(LlmError::HttpError)?;

        Ok(Self {
            http,
            api_key,
            base_url: fix_base_url(&base_url.into()),
        })
    }

    pub fn http(&self) -> &Client {
        &self.http
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_api_key_rejected() {
        assert!(matches!(
            LlmClient::new("", "https://api.openai.com/v1"),
            Err(LlmError::MissingApiKey)
        ));
        assert!(matches!(
            LlmClient::new("   ", "https://api.openai.com/v1"),
            Err(LlmError::MissingApiKey)
        ));
    }

    #[test]
    fn test_base_url_is_normalized() {
        let client = LlmClient::new("sk-test", "https://api.openai.com/v1/").unwrap();
        assert_eq!(client.base_url(), "https://api.openai.com/v1");
        assert_eq!(client.api_key(), "sk-test");
    }
}
