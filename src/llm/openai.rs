//! OpenAI Chat Completions API 流式实现
//!
//! Gemini 的 OpenAI 兼容层也走这里

use async_stream::try_stream;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::format::{build_models_endpoint, build_openai_endpoint};
use super::sse::{data_stream, send_cancellable, send_checked};
use super::types::{ChatChunk, ChatMessage, ChatModel, ChunkStream, LlmError};

/// OpenAI 请求载荷
#[derive(Serialize)]
struct OpenAiRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
}

/// OpenAI SSE 响应块
#[derive(Deserialize, Debug)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAiChoice>,
}

#[derive(Deserialize, Debug)]
struct OpenAiChoice {
    #[serde(default)]
    delta: OpenAiDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize, Debug, Default)]
struct OpenAiDelta {
    content: Option<String>,
}

/// 模型列表响应
#[derive(Deserialize, Debug)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize, Debug)]
struct ModelEntry {
    id: String,
}

/// 查询可用模型
pub async fn list_openai_models(
    client: &Client,
    api_key: &str,
    base_url: &str,
) -> Result<Vec<ChatModel>, LlmError> {
    let endpoint = build_models_endpoint(base_url);
    debug!("OpenAI models request: endpoint={}", endpoint);

    let request = client.get(&endpoint).bearer_auth(api_key);
    let response = send_checked(request, "OpenAI").await?;
    let list: ModelList = serde_json::from_str(&response.text().await?)?;

    Ok(list
        .data
        .into_iter()
        .map(|m| ChatModel::new(m.id.trim_start_matches("models/")))
        .collect())
}

/// 解析单个 SSE 负载
///
/// 无法解析的负载返回 None，不中断流
fn parse_stream_chunk(data: &str) -> Option<ChatChunk> {
    match serde_json::from_str::<OpenAiStreamChunk>(data) {
        Ok(chunk) => chunk.choices.into_iter().next().map(|choice| ChatChunk {
            content: choice.delta.content,
            finish_reason: choice.finish_reason,
        }),
        Err(e) => {
            debug!("Failed to parse OpenAI response: {}, data: {}", e, data);
            None
        }
    }
}

/// 流式调用 OpenAI API
pub fn stream_openai(
    client: &Client,
    api_key: &str,
    base_url: &str,
    messages: &[ChatMessage],
    model: &ChatModel,
    cancel: CancellationToken,
) -> ChunkStream {
    let endpoint = build_openai_endpoint(base_url);
    let payload = OpenAiRequest {
        model: model.id(),
        messages,
        stream: true,
    };
    // 请求体在构造流之前序列化，流本身不借用调用方的消息
    let body = serde_json::to_vec(&payload);
    let request = client
        .post(&endpoint)
        .bearer_auth(api_key)
        .header("Content-Type", "application/json");
    let model = model.clone();

    Box::pin(try_stream! {
        debug!("OpenAI API request: endpoint={}, model={}", endpoint, model);

        let response = send_cancellable(request.body(body?), "OpenAI", &cancel).await?;
        let mut data = Box::pin(data_stream(response, cancel));

        while let Some(payload) = data.next().await {
            if let Some(chunk) = parse_stream_chunk(&payload?) {
                yield chunk;
            }
        }
    })
}
