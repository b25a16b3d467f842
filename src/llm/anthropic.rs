//! Anthropic Messages API 流式实现

use async_stream::try_stream;
use futures::StreamExt;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use super::format::{build_anthropic_endpoint, build_models_endpoint};
use super::sse::{data_stream, send_cancellable, send_checked};
use super::types::{ChatChunk, ChatMessage, ChatModel, ChunkStream, LlmError, Role};

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 8192;

/// Anthropic 请求载荷
#[derive(Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    max_tokens: u32,
}

#[derive(Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

/// Anthropic SSE 事件
#[derive(Deserialize, Debug)]
struct AnthropicEvent {
    #[serde(rename = "type")]
    event_type: String,
    #[serde(default)]
    delta: Option<AnthropicDelta>,
    #[serde(default)]
    error: Option<AnthropicErrorBody>,
}

#[derive(Deserialize, Debug)]
struct AnthropicDelta {
    #[serde(rename = "type")]
    delta_type: Option<String>,
    text: Option<String>,
    stop_reason: Option<String>,
}

#[derive(Deserialize, Debug)]
struct AnthropicErrorBody {
    message: String,
}

#[derive(Deserialize, Debug)]
struct ModelList {
    data: Vec<ModelEntry>,
}

#[derive(Deserialize, Debug)]
struct ModelEntry {
    id: String,
}

fn with_auth(request: RequestBuilder, api_key: &str) -> RequestBuilder {
    request
        .header("x-api-key", api_key)
        .header("anthropic-version", ANTHROPIC_VERSION)
}

/// 系统消息合并到 `system` 字段，其余消息按顺序保留
fn build_request<'a>(messages: &'a [ChatMessage], model: &'a ChatModel) -> AnthropicRequest<'a> {
    let system: Vec<&str> = messages
        .iter()
        .filter(|m| m.role == Role::System)
        .map(|m| m.content.as_str())
        .collect();

    let anthropic_messages = messages
        .iter()
        .filter(|m| m.role != Role::System)
        .map(|m| AnthropicMessage {
            role: m.role.as_str(),
            content: &m.content,
        })
        .collect();

    AnthropicRequest {
        model: model.id(),
        messages: anthropic_messages,
        system: (!system.is_empty()).then(|| system.join("\n\n")),
        stream: true,
        max_tokens: DEFAULT_MAX_TOKENS,
    }
}

/// 查询可用模型
pub async fn list_anthropic_models(
    client: &Client,
    api_key: &str,
    base_url: &str,
) -> Result<Vec<ChatModel>, LlmError> {
    let endpoint = build_models_endpoint(base_url);
    debug!("Anthropic models request: endpoint={}", endpoint);

    let request = with_auth(client.get(&endpoint), api_key);
    let response = send_checked(request, "Anthropic").await?;
    let list: ModelList = serde_json::from_str(&response.text().await?)?;

    Ok(list.data.into_iter().map(|m| ChatModel::new(m.id)).collect())
}

/// 解析单个 SSE 负载
fn parse_event(data: &str) -> Result<Option<ChatChunk>, LlmError> {
    let event = match serde_json::from_str::<AnthropicEvent>(data) {
        Ok(event) => event,
        Err(e) => {
            debug!("Failed to parse Anthropic response: {}, data: {}", e, data);
            return Ok(None);
        }
    };

    let chunk = match event.event_type.as_str() {
        "content_block_delta" => event
            .delta
            .filter(|d| d.delta_type.as_deref() == Some("text_delta"))
            .and_then(|d| d.text)
            .map(ChatChunk::text),
        "message_delta" => event
            .delta
            .and_then(|d| d.stop_reason)
            .map(ChatChunk::finished),
        "error" => {
            let message = event
                .error
                .map(|e| e.message)
                .unwrap_or_else(|| "unknown stream error".to_string());
            return Err(LlmError::StreamError(message));
        }
        _ => None,
    };

    Ok(chunk)
}

/// 流式调用 Anthropic API
pub fn stream_anthropic(
    client: &Client,
    api_key: &str,
    base_url: &str,
    messages: &[ChatMessage],
    model: &ChatModel,
    cancel: CancellationToken,
) -> ChunkStream {
    let endpoint = build_anthropic_endpoint(base_url);
    let body = serde_json::to_vec(&build_request(messages, model));
    let request = with_auth(client.post(&endpoint), api_key)
        .header("Content-Type", "application/json");
    let model = model.clone();

    Box::pin(try_stream! {
        debug!("Anthropic API request: endpoint={}, model={}", endpoint, model);

        let response = send_cancellable(request.body(body?), "Anthropic", &cancel).await?;
        let mut data = Box::pin(data_stream(response, cancel));

        while let Some(payload) = data.next().await {
            if let Some(chunk) = parse_event(&payload?)? {
                yield chunk;
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_build_request_moves_system_prompt() {
        let messages = vec![
            ChatMessage::system("be terse"),
            ChatMessage::user("hello"),
            ChatMessage::assistant("hi"),
        ];
        let model = ChatModel::new("claude-3-5-sonnet");
        let json = serde_json::to_value(build_request(&messages, &model)).unwrap();

        assert_eq!(json["system"], "be terse");
        assert_eq!(json["messages"].as_array().unwrap().len(), 2);
        assert_eq!(json["messages"][0]["role"], "user");
        assert_eq!(json["messages"][1]["role"], "assistant");
        assert_eq!(json["stream"], true);
    }

    #[test]
    fn test_parse_event() {
        let text = parse_event(
            r#"{"type":"content_block_delta","index":0,"delta":{"type":"text_delta","text":"Hi"}}"#,
        )
        .unwrap();
        assert_eq!(text, Some(ChatChunk::text("Hi")));

        let stop = parse_event(r#"{"type":"message_delta","delta":{"stop_reason":"end_turn"}}"#)
            .unwrap();
        assert_eq!(stop, Some(ChatChunk::finished("end_turn")));

        assert_eq!(parse_event(r#"{"type":"ping"}"#).unwrap(), None);
        assert!(matches!(
            parse_event(r#"{"type":"error","error":{"type":"overloaded_error","message":"Overloaded"}}"#),
            Err(LlmError::StreamError(msg)) if msg == "Overloaded"
        ));
    }

    #[tokio::test]
    async fn test_list_models_sends_api_key_header() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/models"))
            .and(header("x-api-key", "test-key"))
            .and(header("anthropic-version", ANTHROPIC_VERSION))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":[{"id":"claude-3-5-sonnet","type":"model"}],"has_more":false}"#,
            ))
            .mount(&server)
            .await;

        let models = list_anthropic_models(&Client::new(), "test-key", &server.uri())
            .await
            .unwrap();
        assert_eq!(models, vec![ChatModel::new("claude-3-5-sonnet")]);
    }

    #[tokio::test]
    async fn test_stream_anthropic_text_deltas() {
        let server = MockServer::start().await;
        let body = concat!(
            "event: message_start\n",
            "data: {\"type\":\"message_start\",\"message\":{}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\"## Foo\"}}\n\n",
            "event: content_block_delta\n",
            "data: {\"type\":\"content_block_delta\",\"index\":0,\"delta\":{\"type\":\"text_delta\",\"text\":\" bar\"}}\n\n",
            "event: message_stop\n",
            "data: {\"type\":\"message_stop\"}\n\n",
        );
        Mock::given(method("POST"))
            .and(path("/v1/messages"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let chunks: Vec<_> = stream_anthropic(
            &Client::new(),
            "test-key",
            &server.uri(),
            &messages,
            &ChatModel::new("claude-3-5-sonnet"),
            CancellationToken::new(),
        )
        .collect()
        .await;

        let text: String = chunks
            .into_iter()
            .filter_map(|c| c.unwrap().content)
            .collect();
        assert_eq!(text, "## Foo bar");
    }
}
