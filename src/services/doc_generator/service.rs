//! 文档生成服务（主入口）
//!
//! 串联模型选择、目录扫描和批量处理

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use super::generator::DocumentGenerator;
use super::processor::{BatchProcessor, ProcessorError};
use super::scanner::{DirectoryScanner, ScanError};
use super::types::{RunConfig, RunStats};
use crate::llm::{ChatModel, ChatProvider, LlmError};

/// 文档生成服务
pub struct DocGenService {
    config: RunConfig,
}

impl DocGenService {
    /// 创建新的文档生成服务
    pub fn new(config: RunConfig) -> Self {
        Self { config }
    }

    /// 执行一次完整会话
    ///
    /// 1. 查询模型列表（失败时不处理任何文件）
    /// 2. 通过 `select_model` 选择模型
    /// 3. 扫描目录并批量生成文档
    pub async fn run_session<F>(
        &self,
        mut provider: Box<dyn ChatProvider>,
        select_model: F,
        cancel: CancellationToken,
    ) -> Result<RunStats, SessionError>
    where
        F: FnOnce(&[ChatModel]) -> Option<usize>,
    {
        let models = provider.list_models().await?;
        if models.is_empty() {
            return Err(SessionError::NoModels);
        }

        let index = select_model(&models).ok_or(SessionError::ModelNotChosen)?;
        let model = models
            .get(index)
            .cloned()
            .ok_or(SessionError::InvalidModelIndex { index, count: models.len() })?;
        info!("Selected model: {}", model);
        provider.set_chat_model(model);

        self.run(Arc::from(provider), cancel).await
    }

    /// 使用已选好模型的 Provider 扫描并生成文档
    pub async fn run(
        &self,
        provider: Arc<dyn ChatProvider>,
        cancel: CancellationToken,
    ) -> Result<RunStats, SessionError> {
        let model = provider.chat_model().ok_or(LlmError::ModelNotSelected)?;
        info!("Generating documents with {} model {}", provider.kind(), model);

        let scanner = DirectoryScanner::new(self.config.docgen.clone());
        let files = scanner.scan(&self.config.root, &self.config.pattern)?;

        let generator = Arc::new(DocumentGenerator::new(provider, cancel));
        let processor = BatchProcessor::new(
            generator,
            self.config.root.clone(),
            self.config.output_root.clone(),
            self.config.docgen.concurrency,
        );

        Ok(processor.run(files).await?)
    }
}

/// 会话错误类型
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("Provider returned no models")]
    NoModels,

    #[error("No model selected")]
    ModelNotChosen,

    #[error("Model index {index} out of range (0..{count})")]
    InvalidModelIndex { index: usize, count: usize },

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Processor(#[from] ProcessorError),
}
