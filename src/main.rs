//! Obsidian Docgen
//!
//! 交互式命令行工具：扫描当前目录下匹配模式的源文件，调用 LLM 为每个文件
//! 生成 Obsidian 风格的 Markdown 文档，输出到 `Obsidian/` 镜像目录。

use anyhow::Context;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod console;
mod error;
mod llm;
mod services;

use config::{get_config, resolve_api_key};
use llm::{get_provider, get_provider_with_base_url};
use services::doc_generator::{DocGenService, RunConfig};

/// 在 Windows 上设置控制台代码页为 UTF-8
#[cfg(windows)]
fn setup_console_encoding() {
    unsafe {
        // 设置控制台输出代码页为 UTF-8 (65001)
        extern "system" {
            fn SetConsoleOutputCP(code_page: u32) -> i32;
            fn SetConsoleCP(code_page: u32) -> i32;
        }
        SetConsoleOutputCP(65001);
        SetConsoleCP(65001);
    }
}

#[cfg(not(windows))]
fn setup_console_encoding() {}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    setup_console_encoding();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "obsidian_docgen=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = get_config();
    let api_key = resolve_api_key(&config)?;
    let provider = match config.base_url.as_deref() {
        Some(base_url) => get_provider_with_base_url(&config.provider, &api_key, Some(base_url))?,
        None => get_provider(&config.provider, &api_key)?,
    };
    info!("Using provider: {}", provider.kind());

    let pattern = console::prompt_pattern()?;

    let root = std::env::current_dir().context("无法获取当前目录")?;
    let run_config = RunConfig::new(root, pattern, config.docgen.clone());
    info!(
        "Scanning {} for '{}', output to {}",
        run_config.root.display(),
        run_config.pattern,
        run_config.output_root.display()
    );

    // Ctrl-C 取消所有进行中的请求
    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling in-flight requests...");
            signal_token.cancel();
        }
    });

    let select_model = |models: &[llm::ChatModel]| {
        match console::choose_model(models) {
            Ok(choice) => choice,
            Err(e) => {
                warn!("Failed to read model selection: {}", e);
                None
            }
        }
    };

    let stats = DocGenService::new(run_config)
        .run_session(provider, select_model, cancel)
        .await?;

    info!(
        "Done: {} files, {} generated, {} reformatted in {}ms",
        stats.total_files, stats.generated, stats.reformatted, stats.elapsed_ms
    );
    Ok(())
}
