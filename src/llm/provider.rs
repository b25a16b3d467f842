//! Provider 能力接口
//!
//! 每个 Provider 提供模型列表查询和流式聊天两项能力。
//! 三个实现彼此独立，只共享 [`LlmClient`] 和协议函数。

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::anthropic::{list_anthropic_models, stream_anthropic};
use super::client::LlmClient;
use super::format::ProviderKind;
use super::openai::{list_openai_models, stream_openai};
use super::types::{ChatMessage, ChatModel, ChunkStream, LlmError};

/// Provider 能力接口
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Provider 种类
    fn kind(&self) -> ProviderKind;

    /// 查询可用模型
    async fn list_models(&self) -> Result<Vec<ChatModel>, LlmError>;

    /// 当前选中的模型
    fn chat_model(&self) -> Option<&ChatModel>;

    /// 选择模型（每个会话一次）
    fn set_chat_model(&mut self, model: ChatModel);

    /// 流式聊天
    ///
    /// 未选择模型或消息为空时直接返回错误，不发起请求
    fn stream_chat(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<ChunkStream, LlmError>;
}

/// 检查流式调用的前置条件，返回当前模型
pub fn ensure_ready<'a>(
    model: Option<&'a ChatModel>,
    messages: &[ChatMessage],
) -> Result<&'a ChatModel, LlmError> {
    let model = model.ok_or(LlmError::ModelNotSelected)?;
    if messages.is_empty() {
        return Err(LlmError::EmptyTranscript);
    }
    Ok(model)
}

/// OpenAI Provider
pub struct OpenAiProvider {
    client: LlmClient,
    model: Option<ChatModel>,
}

impl OpenAiProvider {
    pub fn new(client: LlmClient) -> Self {
        Self { client, model: None }
    }
}

#[async_trait]
impl ChatProvider for OpenAiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAi
    }

    async fn list_models(&self) -> Result<Vec<ChatModel>, LlmError> {
        list_openai_models(self.client.http(), self.client.api_key(), self.client.base_url()).await
    }

    fn chat_model(&self) -> Option<&ChatModel> {
        self.model.as_ref()
    }

    fn set_chat_model(&mut self, model: ChatModel) {
        self.model = Some(model);
    }

    fn stream_chat(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<ChunkStream, LlmError> {
        let model = ensure_ready(self.model.as_ref(), messages)?;
        Ok(stream_openai(
            self.client.http(),
            self.client.api_key(),
            self.client.base_url(),
            messages,
            model,
            cancel,
        ))
    }
}

/// Gemini Provider（OpenAI 兼容端点）
pub struct GeminiProvider {
    client: LlmClient,
    model: Option<ChatModel>,
}

impl GeminiProvider {
    pub fn new(client: LlmClient) -> Self {
        Self { client, model: None }
    }
}

#[async_trait]
impl ChatProvider for GeminiProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Gemini
    }

    async fn list_models(&self) -> Result<Vec<ChatModel>, LlmError> {
        list_openai_models(self.client.http(), self.client.api_key(), self.client.base_url()).await
    }

    fn chat_model(&self) -> Option<&ChatModel> {
        self.model.as_ref()
    }

    fn set_chat_model(&mut self, model: ChatModel) {
        self.model = Some(model);
    }

    fn stream_chat(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<ChunkStream, LlmError> {
        let model = ensure_ready(self.model.as_ref(), messages)?;
        Ok(stream_openai(
            self.client.http(),
            self.client.api_key(),
            self.client.base_url(),
            messages,
            model,
            cancel,
        ))
    }
}

/// Anthropic Provider
pub struct AnthropicProvider {
    client: LlmClient,
    model: Option<ChatModel>,
}

impl AnthropicProvider {
    pub fn new(client: LlmClient) -> Self {
        Self { client, model: None }
    }
}

#[async_trait]
impl ChatProvider for AnthropicProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
    }

    async fn list_models(&self) -> Result<Vec<ChatModel>, LlmError> {
        list_anthropic_models(self.client.http(), self.client.api_key(), self.client.base_url())
            .await
    }

    fn chat_model(&self) -> Option<&ChatModel> {
        self.model.as_ref()
    }

    fn set_chat_model(&mut self, model: ChatModel) {
        self.model = Some(model);
    }

    fn stream_chat(
        &self,
        messages: &[ChatMessage],
        cancel: CancellationToken,
    ) -> Result<ChunkStream, LlmError> {
        let model = ensure_ready(self.model.as_ref(), messages)?;
        Ok(stream_anthropic(
            self.client.http(),
            self.client.api_key(),
            self.client.base_url(),
            messages,
            model,
            cancel,
        ))
    }
}

/// 按标识创建 Provider，使用默认端点
pub fn get_provider(key: &str, api_key: &str) -> Result<Box<dyn ChatProvider>, LlmError> {
    get_provider_with_base_url(key, api_key, None)
}

/// 按标识创建 Provider
///
/// 未知标识返回 `UnsupportedProvider`，空密钥返回 `MissingApiKey`
pub fn get_provider_with_base_url(
    key: &str,
    api_key: &str,
    base_url: Option<&str>,
) -> Result<Box<dyn ChatProvider>, LlmError> {
    let kind: ProviderKind = key.parse()?;
    let base_url = base_url.unwrap_or_else(|| kind.default_base_url());
    let client = LlmClient::new(api_key, base_url)?;

    info!("LLM provider: {}, base_url={}", kind, client.base_url());

    let provider: Box<dyn ChatProvider> = match kind {
        ProviderKind::OpenAi => Box::new(OpenAiProvider::new(client)),
        ProviderKind::Anthropic => Box::new(AnthropicProvider::new(client)),
        ProviderKind::Gemini => Box::new(GeminiProvider::new(client)),
    };
    Ok(provider)
}
