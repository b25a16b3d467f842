//! 对话记录
//!
//! 每个文件任务持有独立的 Transcript，并发任务之间不共享消息列表

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use tokio_util::sync::CancellationToken;

use super::provider::ChatProvider;
use super::types::{ChatChunk, ChatMessage, LlmError};

/// 有序的消息列表
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// 流式获取回复
    ///
    /// 流正常结束后，完整回复作为 Assistant 消息追加到记录末尾。
    /// 前置条件不满足时（未选模型、记录为空）直接返回错误。
    pub fn stream_reply<'a>(
        &'a mut self,
        provider: &dyn ChatProvider,
        cancel: CancellationToken,
    ) -> Result<impl Stream<Item = Result<ChatChunk, LlmError>> + Send + 'a, LlmError> {
        let mut inner = provider.stream_chat(self.messages(), cancel)?;
        let messages = &mut self.messages;

        Ok(try_stream! {
            let mut reply = String::with_capacity(2048);
            while let Some(chunk) = inner.next().await {
                let chunk = chunk?;
                if let Some(text) = &chunk.content {
                    reply.push_str(text);
                }
                yield chunk;
            }
            messages.push(ChatMessage::assistant(reply));
        })
    }

    /// 流式获取回复并拼接为完整文本
    pub async fn collect_reply(
        &mut self,
        provider: &dyn ChatProvider,
        cancel: CancellationToken,
    ) -> Result<String, LlmError> {
        let mut stream = Box::pin(self.stream_reply(provider, cancel)?);
        let mut text = String::new();
        while let Some(chunk) = stream.next().await {
            if let Some(content) = chunk?.content {
                text.push_str(&content);
            }
        }
        Ok(text)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::{ChatModel, ChunkStream, ProviderKind, Role};
    use async_trait::async_trait;
    use futures::stream;

    /// 按固定片段回复的测试 Provider
    pub struct ScriptedProvider {
        pub model: Option<ChatModel>,
        pub fragments: Vec<String>,
    }

    impl ScriptedProvider {
        pub fn new(fragments: &[&str]) -> Self {
            Self {
                model: Some(ChatModel::new("test-model")),
                fragments: fragments.iter().map(|s| s.to_string()).collect(),
            }
        }
    }

    #[async_trait]
    impl ChatProvider for ScriptedProvider {
        fn kind(&self) -> ProviderKind {
            ProviderKind::OpenAi
        }

        async fn list_models(&self) -> Result<Vec<ChatModel>, LlmError> {
            Ok(self.model.iter().cloned().collect())
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
            _cancel: CancellationToken,
        ) -> Result<ChunkStream, LlmError> {
            crate::llm::provider::ensure_ready(self.model.as_ref(), messages)?;
            let chunks: Vec<Result<ChatChunk, LlmError>> = self
                .fragments
                .iter()
                .map(|f| Ok(ChatChunk::text(f.clone())))
                .collect();
            Ok(Box::pin(stream::iter(chunks)))
        }
    }

    #[tokio::test]
    async fn test_reply_appended_as_assistant_message() {
        let provider = ScriptedProvider::new(&["Hel", "lo", "!"]);
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::system("sys"));
        transcript.push(ChatMessage::user("hi"));

        let text = transcript
            .collect_reply(&provider, CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(text, "Hello!");
        assert_eq!(transcript.messages().len(), 3);
        assert_eq!(transcript.messages()[2], ChatMessage::assistant("Hello!"));
    }

    #[tokio::test]
    async fn test_transcript_accumulates_across_replies() {
        let provider = ScriptedProvider::new(&["ok"]);
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("one"));
        transcript.collect_reply(&provider, CancellationToken::new()).await.unwrap();
        transcript.push(ChatMessage::user("two"));
        transcript.collect_reply(&provider, CancellationToken::new()).await.unwrap();

        let roles: Vec<Role> = transcript.messages().iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![Role::User, Role::Assistant, Role::User, Role::Assistant]);
    }

    #[tokio::test]
    async fn test_empty_transcript_rejected() {
        let provider = ScriptedProvider::new(&["ok"]);
        let mut transcript = Transcript::new();

        let result = transcript.collect_reply(&provider, CancellationToken::new()).await;
        assert!(matches!(result, Err(LlmError::EmptyTranscript)));
    }

    #[tokio::test]
    async fn test_missing_model_rejected() {
        let mut provider = ScriptedProvider::new(&["ok"]);
        provider.model = None;
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::user("hi"));

        let result = transcript.collect_reply(&provider, CancellationToken::new()).await;
        assert!(matches!(result, Err(LlmError::ModelNotSelected)));
        assert_eq!(transcript.messages().len(), 1);
    }
}
