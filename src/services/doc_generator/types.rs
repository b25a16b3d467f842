//! 文档生成器类型定义
//!
//! 定义文件任务、运行配置和统计信息等核心类型

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;

/// 文件任务的处理方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskAction {
    /// 调用 LLM 生成文档
    Generate,
    /// 文档已存在，仅重新清理
    Reformat,
}

/// 单个文件任务：源文件和镜像输出路径
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    /// 源文件路径
    pub source: PathBuf,
    /// 输出文档路径
    pub target: PathBuf,
}

impl FileTask {
    /// 根据扫描根目录和输出根目录计算镜像路径
    ///
    /// 例如: root/src/Foo.cs -> output_root/src/Foo.md
    pub fn mirrored(source: PathBuf, scan_root: &Path, output_root: &Path) -> Self {
        let target = mirror_path(&source, scan_root, output_root);
        Self { source, target }
    }

    /// 输出已存在时只做清理
    pub async fn action(&self) -> TaskAction {
        match tokio::fs::try_exists(&self.target).await {
            Ok(true) => TaskAction::Reformat,
            _ => TaskAction::Generate,
        }
    }
}

/// 计算输出文档路径
///
/// 文件名取源文件去掉最后一个扩展名后加 `.md`；
/// 不在扫描根目录下的文件直接放在输出根目录
pub fn mirror_path(source: &Path, scan_root: &Path, output_root: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let doc_name = format!("{}.md", stem);

    let parent = source
        .strip_prefix(scan_root)
        .ok()
        .and_then(|relative| relative.parent());

    match parent {
        Some(p) if !p.as_os_str().is_empty() => output_root.join(p).join(doc_name),
        _ => output_root.join(doc_name),
    }
}

/// 文档生成配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocGenConfig {
    /// 输出目录名（默认 "Obsidian"）
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// 同时处理的文件数（默认4）
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// 扫描时跳过的目录名模式
    #[serde(default)]
    pub ignore_patterns: Vec<String>,
}

fn default_output_dir() -> String {
    "Obsidian".to_string()
}

fn default_concurrency() -> usize {
    4
}

impl Default for DocGenConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            concurrency: default_concurrency(),
            ignore_patterns: Vec::new(),
        }
    }
}

/// 单次运行的不可变配置
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// 扫描根目录
    pub root: PathBuf,
    /// 文件名匹配模式（如 "*.cs"）
    pub pattern: String,
    /// 输出根目录
    pub output_root: PathBuf,
    /// 生成配置
    pub docgen: DocGenConfig,
}

impl RunConfig {
    /// 输出目录位于扫描根目录下
    pub fn new(root: PathBuf, pattern: impl Into<String>, docgen: DocGenConfig) -> Self {
        let output_root = root.join(&docgen.output_dir);
        Self {
            root,
            pattern: pattern.into(),
            output_root,
            docgen,
        }
    }
}

/// 运行统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunStats {
    /// 总文件数
    pub total_files: usize,
    /// 新生成的文档数
    pub generated: usize,
    /// 仅重新清理的文档数
    pub reformatted: usize,
    /// 失败数量
    pub failed: usize,
    /// 耗时（毫秒）
    pub elapsed_ms: u64,
}

impl RunStats {
    pub fn finish(&mut self, started: Instant) {
        self.elapsed_ms = started.elapsed().as_millis() as u64;
    }
}
