//! SSE 流处理
//!
//! OpenAI 和 Anthropic 两种协议共用的 HTTP 发送与 `data:` 行切分逻辑

use async_stream::try_stream;
use futures::{Stream, StreamExt};
use reqwest::{RequestBuilder, Response};
use tokio_util::sync::CancellationToken;
use tracing::error;

use super::types::LlmError;

/// 单行 SSE 数据
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SseEvent {
    /// `data: ...` 的负载
    Data(String),
    /// `data: [DONE]`
    Done,
}

/// SSE 行缓冲区
///
/// 字节块可能在任意位置截断（包括多字节字符中间），
/// 未结束的行以字节形式保留到下一次 push，只解码完整行
#[derive(Debug, Default)]
pub struct SseLineBuffer {
    buffer: Vec<u8>,
}

impl SseLineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加字节并取出所有完整行中的事件
    ///
    /// 完整行不是合法 UTF-8 时返回 `StreamError`
    pub fn push(&mut self, bytes: &[u8]) -> Result<Vec<SseEvent>, LlmError> {
        self.buffer.extend_from_slice(bytes);

        let mut events = Vec::new();
        while let Some(newline_pos) = self.buffer.iter().position(|&b| b == b'\n') {
            let raw: Vec<u8> = self.buffer.drain(..=newline_pos).collect();
            let line = std::str::from_utf8(&raw)
                .map_err(|e| LlmError::StreamError(format!("invalid UTF-8 in SSE line: {}", e)))?
                .trim();

            if line.is_empty() {
                continue;
            }

            if let Some(data) = line.strip_prefix("data:") {
                let data = data.trim_start();
                if data == "[DONE]" {
                    events.push(SseEvent::Done);
                } else {
                    events.push(SseEvent::Data(data.to_string()));
                }
            }
        }
        Ok(events)
    }
}

/// 发送流式请求，等待响应头期间也响应取消
pub async fn send_cancellable(
    request: RequestBuilder,
    label: &str,
    cancel: &CancellationToken,
) -> Result<Response, LlmError> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(LlmError::Cancelled),
        response = send_checked(request, label) => response,
    }
}

/// 发送请求并检查状态码
pub async fn send_checked(request: RequestBuilder, label: &str) -> Result<Response, LlmError> {
    let response = request.send().await?;

    let status = response.status();
    if !status.is_success() {
        let status_code = status.as_u16();
        let error_text = response.text().await.unwrap_or_default();
        let preview: String = error_text.chars().take(500).collect();
        error!("{} API error: status={}, body={}", label, status_code, preview);
        return Err(LlmError::ApiError {
            status: status_code,
            message: error_text,
        });
    }

    Ok(response)
}

/// 将响应体转换为 SSE `data:` 负载流
///
/// 遇到 `[DONE]` 或响应体结束时流结束；取消令牌触发时以 `Cancelled` 结束
pub fn data_stream(
    response: Response,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<String, LlmError>> + Send {
    try_stream! {
        let mut lines = SseLineBuffer::new();
        let mut body = response.bytes_stream();

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => None,
                chunk = body.next() => Some(chunk),
            };

            let chunk = match next {
                None => Err(LlmError::Cancelled)?,
                Some(None) => break,
                Some(Some(chunk)) => chunk?,
            };

            for event in lines.push(&chunk)? {
                if cancel.is_cancelled() {
                    Err::<(), _>(LlmError::Cancelled)?;
                }
                match event {
                    SseEvent::Data(data) => yield data,
                    SseEvent::Done => return,
                }
            }
        }
    }
}
