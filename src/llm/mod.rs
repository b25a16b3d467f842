//! LLM 模块
//!
//! 提供统一的 Provider 接口，支持 OpenAI、Anthropic 和 Gemini（OpenAI 兼容层）。

mod anthropic;
mod client;
mod format;
mod openai;
pub mod provider;
mod sse;
mod transcript;
mod types;

pub use format::ProviderKind;
pub use provider::{get_provider, get_provider_with_base_url, ChatProvider};
pub use transcript::Transcript;
pub use types::*;

#[cfg(test)]
pub(crate) use transcript::tests::ScriptedProvider;
