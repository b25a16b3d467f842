//! 目录扫描器
//!
//! 递归扫描根目录，收集文件名匹配模式的文件

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use super::types::DocGenConfig;

/// 目录扫描器
pub struct DirectoryScanner {
    config: DocGenConfig,
    /// 编译后的忽略模式（glob patterns）
    ignore_patterns: Vec<glob::Pattern>,
}

impl DirectoryScanner {
    /// 创建新的目录扫描器
    pub fn new(config: DocGenConfig) -> Self {
        let ignore_patterns = config
            .ignore_patterns
            .iter()
            .filter_map(|p| match glob::Pattern::new(p) {
                Ok(pattern) => Some(pattern),
                Err(e) => {
                    warn!("Invalid ignore pattern '{}': {}", p, e);
                    None
                }
            })
            .collect();

        Self {
            config,
            ignore_patterns,
        }
    }

    /// 扫描目录，返回按路径排序的匹配文件
    ///
    /// 根目录下的输出目录不参与扫描
    pub fn scan(&self, root_path: &Path, pattern: &str) -> Result<Vec<PathBuf>, ScanError> {
        if !root_path.exists() {
            return Err(ScanError::PathNotFound(root_path.to_path_buf()));
        }

        if !root_path.is_dir() {
            return Err(ScanError::NotADirectory(root_path.to_path_buf()));
        }

        let matcher = glob::Pattern::new(pattern.trim())
            .map_err(|e| ScanError::InvalidPattern(pattern.to_string(), e))?;
        let output_root = root_path.join(&self.config.output_dir);

        info!("Starting directory scan: {} (pattern: {})", root_path.display(), pattern);

        let walker = WalkDir::new(root_path)
            .follow_links(false)
            .into_iter()
            .filter_entry(|entry| {
                if entry.depth() == 0 {
                    return true;
                }
                if !entry.file_type().is_dir() {
                    return true;
                }
                if entry.path() == output_root {
                    debug!("Skipping output directory: {}", entry.path().display());
                    return false;
                }
                !self.should_ignore(&entry.file_name().to_string_lossy())
            });

        let mut files = Vec::new();
        for entry in walker {
            let entry = entry.map_err(|e| {
                let path = e.path().map(Path::to_path_buf).unwrap_or_else(|| root_path.to_path_buf());
                ScanError::Walk(path, e)
            })?;

            if entry.file_type().is_file() && matcher.matches(&entry.file_name().to_string_lossy()) {
                files.push(entry.into_path());
            }
        }

        files.sort();
        info!("Scan completed: {} matching files", files.len());
        Ok(files)
    }

    /// 检查目录名是否匹配忽略模式
    fn should_ignore(&self, name: &str) -> bool {
        self.ignore_patterns.iter().any(|p| p.matches(name))
    }
}

/// 扫描错误类型
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("路径不存在: {0}")]
    PathNotFound(PathBuf),

    #[error("路径不是目录: {0}")]
    NotADirectory(PathBuf),

    #[error("无效的匹配模式 '{0}': {1}")]
    InvalidPattern(String, #[source] glob::PatternError),

    #[error("遍历错误 ({0}): {1}")]
    Walk(PathBuf, #[source] walkdir::Error),
}
