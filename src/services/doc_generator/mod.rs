//! 文档生成器模块
//!
//! 提供基于 LLM 的 Obsidian 文档批量生成功能
//!
//! # 功能
//!
//! - 递归扫描源码目录，按文件名模式收集文件
//! - 调用 LLM 为每个文件生成 Markdown 文档
//! - 输出目录镜像源码目录结构，已生成的文档只重新清理
//! - 信号量限制同时处理的文件数
//!
//! # 使用示例
//!
//! ```ignore
//! let config = RunConfig::new(std::env::current_dir()?, "*.cs", DocGenConfig::default());
//! let provider = get_provider("Gemini", &api_key)?;
//!
//! let stats = DocGenService::new(config)
//!     .run_session(provider, |models| Some(0), CancellationToken::new())
//!     .await?;
//! ```

mod cleanup;
mod generator;
mod processor;
pub mod prompts;
mod scanner;
mod service;
pub mod types;

pub use service::DocGenService;
pub use types::{DocGenConfig, RunConfig};
