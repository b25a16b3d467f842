//! 文档生成器
//!
//! 负责调用 LLM 生成单个文件的 Markdown 文档

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::cleanup::clean_content;
use super::prompts;
use crate::llm::{ChatMessage, ChatProvider, LlmError, Transcript};

/// Markdown 文档生成接口
#[async_trait]
pub trait MarkdownGenerator: Send + Sync {
    /// 根据文件内容生成文档，`source_path` 仅用于末尾的源文件链接
    async fn generate(&self, content: &str, source_path: &Path) -> Result<String, GeneratorError>;
}

/// 基于 LLM Provider 的文档生成器
pub struct DocumentGenerator {
    provider: Arc<dyn ChatProvider>,
    cancel: CancellationToken,
}

impl DocumentGenerator {
    /// 创建新的文档生成器
    pub fn new(provider: Arc<dyn ChatProvider>, cancel: CancellationToken) -> Self {
        Self { provider, cancel }
    }

    /// 构建单个文件的对话记录（系统指令 + 用户 Prompt）
    pub fn build_transcript(content: &str) -> Transcript {
        let mut transcript = Transcript::new();
        transcript.push(ChatMessage::system(prompts::SYSTEM_PROMPT));
        transcript.push(ChatMessage::user(prompts::format_file_doc_prompt(content)));
        transcript
    }
}

#[async_trait]
impl MarkdownGenerator for DocumentGenerator {
    async fn generate(&self, content: &str, source_path: &Path) -> Result<String, GeneratorError> {
        let mut transcript = Self::build_transcript(content);
        debug!(
            "Requesting document for {} ({} messages)",
            source_path.display(),
            transcript.messages().len()
        );

        let reply = transcript
            .collect_reply(self.provider.as_ref(), self.cancel.clone())
            .await?;
        debug!("Received {} chars for {}", reply.len(), source_path.display());

        Ok(clean_content(&append_backlink(reply, source_path)))
    }
}

/// 追加 `Definition:` 标记和指向源文件的链接
pub fn append_backlink(mut doc: String, source_path: &Path) -> String {
    let file_name = source_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    doc.push('\n');
    doc.push_str("Definition:\n");
    doc.push_str(&format!("[{}](<{}>)\n", file_name, source_path.display()));
    doc
}

/// 生成器错误类型
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("IO错误 ({0}): {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("LLM调用错误: {0}")]
    LlmError(#[from] LlmError),
}
