//! 批量处理器
//!
//! 为每个文件派发一个任务，用信号量限制同时运行的任务数

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::fs;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tracing::{error, info};

use super::cleanup::clean_content;
use super::generator::{GeneratorError, MarkdownGenerator};
use super::types::{FileTask, RunStats, TaskAction};

/// 批量处理器
pub struct BatchProcessor {
    /// 文档生成器
    generator: Arc<dyn MarkdownGenerator>,
    /// 扫描根目录
    scan_root: PathBuf,
    /// 输出根目录
    output_root: PathBuf,
    /// 并行控制信号量
    semaphore: Arc<Semaphore>,
}

impl BatchProcessor {
    /// 创建新的批量处理器
    pub fn new(
        generator: Arc<dyn MarkdownGenerator>,
        scan_root: PathBuf,
        output_root: PathBuf,
        concurrency: usize,
    ) -> Self {
        let concurrency = concurrency.max(1);
        info!("Document generation concurrency: {}", concurrency);

        Self {
            generator,
            scan_root,
            output_root,
            semaphore: Arc::new(Semaphore::new(concurrency)),
        }
    }

    /// 处理所有文件
    ///
    /// 单个文件失败不会中断其它任务；全部任务结束后统一返回失败列表
    pub async fn run(&self, files: Vec<PathBuf>) -> Result<RunStats, ProcessorError> {
        let started = Instant::now();

        fs::create_dir_all(&self.output_root)
            .await
            .map_err(|e| ProcessorError::IoError(self.output_root.clone(), e))?;

        let generated = Arc::new(AtomicUsize::new(0));
        let reformatted = Arc::new(AtomicUsize::new(0));
        let mut handles: Vec<(PathBuf, JoinHandle<Result<TaskAction, GeneratorError>>)> =
            Vec::with_capacity(files.len());

        info!("Processing {} files", files.len());

        for file in files {
            // 获取许可后才派发，许可随任务结束释放
            let permit = Arc::clone(&self.semaphore)
                .acquire_owned()
                .await
                .map_err(|_| ProcessorError::SemaphoreClosed)?;

            let task = FileTask::mirrored(file.clone(), &self.scan_root, &self.output_root);
            let generator = Arc::clone(&self.generator);
            let generated = Arc::clone(&generated);
            let reformatted = Arc::clone(&reformatted);

            let handle = tokio::spawn(async move {
                let _permit = permit;
                let action = process_file(generator.as_ref(), &task).await?;
                match action {
                    TaskAction::Generate => generated.fetch_add(1, Ordering::Relaxed),
                    TaskAction::Reformat => reformatted.fetch_add(1, Ordering::Relaxed),
                };
                Ok(action)
            });
            handles.push((file, handle));
        }

        let total_files = handles.len();
        let mut failures = Vec::new();

        for (path, handle) in handles {
            let outcome = match handle.await {
                Ok(Ok(_)) => continue,
                Ok(Err(e)) => e.to_string(),
                Err(e) => format!("task panicked: {}", e),
            };
            error!("Failed to process {}: {}", path.display(), outcome);
            failures.push(FileFailure { path, error: outcome });
        }

        let mut stats = RunStats {
            total_files,
            generated: generated.load(Ordering::Relaxed),
            reformatted: reformatted.load(Ordering::Relaxed),
            failed: failures.len(),
            elapsed_ms: 0,
        };
        stats.finish(started);

        if !failures.is_empty() {
            return Err(ProcessorError::FilesFailed { stats, failures });
        }

        info!(
            "Processing completed: {} generated, {} reformatted in {} ms",
            stats.generated, stats.reformatted, stats.elapsed_ms
        );
        Ok(stats)
    }
}

/// 处理单个文件
///
/// 输出已存在时只重新清理；否则生成文档并写入镜像路径
pub async fn process_file(
    generator: &dyn MarkdownGenerator,
    task: &FileTask,
) -> Result<TaskAction, GeneratorError> {
    let action = task.action().await;

    match action {
        TaskAction::Reformat => {
            info!("Already generated: {}", task.target.display());
            reformat_file(&task.target).await?;
        }
        TaskAction::Generate => {
            let content = read_text(&task.source).await?;
            let markdown = generator.generate(&content, &task.source).await?;

            if let Some(parent) = task.target.parent() {
                fs::create_dir_all(parent)
                    .await
                    .map_err(|e| GeneratorError::IoError(parent.to_path_buf(), e))?;
            }
            fs::write(&task.target, markdown)
                .await
                .map_err(|e| GeneratorError::IoError(task.target.clone(), e))?;

            info!("Generated: {}", task.target.display());
        }
    }

    Ok(action)
}

/// 重新清理已存在的文档
pub async fn reformat_file(path: &Path) -> Result<(), GeneratorError> {
    let contents = read_text(path).await?;
    let cleaned = clean_content(&contents);

    fs::write(path, cleaned)
        .await
        .map_err(|e| GeneratorError::IoError(path.to_path_buf(), e))
}

async fn read_text(path: &Path) -> Result<String, GeneratorError> {
    fs::read_to_string(path)
        .await
        .map_err(|e| GeneratorError::IoError(path.to_path_buf(), e))
}

/// 单个文件的失败记录
#[derive(Debug, Clone)]
pub struct FileFailure {
    pub path: PathBuf,
    pub error: String,
}

/// 处理器错误类型
#[derive(Debug, thiserror::Error)]
pub enum ProcessorError {
    #[error("IO错误 ({0}): {1}")]
    IoError(PathBuf, #[source] std::io::Error),

    #[error("Semaphore closed")]
    SemaphoreClosed,

    #[error("{} of {} files failed, first: {}", .failures.len(), .stats.total_files, first_failure(.failures))]
    FilesFailed {
        stats: RunStats,
        failures: Vec<FileFailure>,
    },
}

fn first_failure(failures: &[FileFailure]) -> String {
    failures
        .first()
        .map(|f| format!("{} ({})", f.path.display(), f.error))
        .unwrap_or_default()
}
