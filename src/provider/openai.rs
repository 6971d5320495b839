//! OpenAI Chat Completions API provider.

use std::collections::BTreeMap;

use async_trait::async_trait;
use futures::stream::BoxStream;
use futures::StreamExt;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::CourierError;
use crate::types::*;

use super::http::{bearer_headers, parse_sse_data, shared_client, take_line};
use super::{ModelProvider, ProviderRequest, ProviderResponse};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

pub struct OpenAiProvider {
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(model: String, api_key: String, base_url: Option<String>) -> Self {
        Self {
            base_url: base_url
                .map(|u| u.trim_end_matches('/').to_string())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model,
            api_key,
        }
    }

    fn build_request_body(&self, request: &ProviderRequest, stream: bool) -> serde_json::Value {
        let messages = request
            .messages
            .iter()
            .map(message_to_openai)
            .collect::<Vec<_>>();

        let mut body = serde_json::Map::new();
        body.insert("model".into(), self.model.clone().into());
        body.insert("messages".into(), messages.into());
        body.insert("stream".into(), stream.into());
        if stream {
            body.insert(
                "stream_options".into(),
                serde_json::json!({ "include_usage": true }),
            );
        }

        if let Some(max) = request.settings.max_tokens {
            body.insert("max_tokens".into(), max.into());
        }
        if let Some(temp) = request.settings.temperature {
            body.insert("temperature".into(), temp.into());
        }
        if let Some(top_p) = request.settings.top_p {
            body.insert("top_p".into(), top_p.into());
        }
        if let Some(ref stops) = request.settings.stop_sequences {
            body.insert("stop".into(), serde_json::json!(stops));
        }
        if let Some(seed) = request.settings.seed {
            body.insert("seed".into(), seed.into());
        }
        if let Some(ref user) = request.settings.user {
            body.insert("user".into(), user.clone().into());
        }

        if let Some(ref tools) = request.tools {
            if !tools.is_empty() {
                let tool_defs: Vec<serde_json::Value> = tools
                    .iter()
                    .map(|t| {
                        serde_json::json!({
                            "type": "function",
                            "function": {
                                "name": t.name,
                                "description": t.description,
                                "parameters": t.parameters,
                            }
                        })
                    })
                    .collect();
                body.insert("tools".into(), tool_defs.into());
            }
        }

        match request.response_format {
            Some(ResponseFormat::JsonSchema {
                ref schema,
                ref name,
            }) => {
                body.insert(
                    "response_format".into(),
                    serde_json::json!({
                        "type": "json_schema",
                        "json_schema": {
                            "name": name,
                            "schema": schema,
                            "strict": true,
                        }
                    }),
                );
            }
            Some(ResponseFormat::Text) | None => {}
        }

        serde_json::Value::Object(body)
    }

    async fn post(
        &self,
        request: &ProviderRequest,
        stream: bool,
    ) -> Result<reqwest::Response, CourierError> {
        let body = self.build_request_body(request, stream);
        let url = format!("{}/chat/completions", self.base_url);

        let resp = shared_client()
            .post(&url)
            .headers(bearer_headers(&self.api_key))
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body_text = resp.text().await.unwrap_or_default();
            return Err(super::http::status_to_error(status.as_u16(), &body_text));
        }
        Ok(resp)
    }
}

#[async_trait]
impl ModelProvider for OpenAiProvider {
    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_id(&self) -> &str {
        &self.model
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, CourierError> {
        debug!(model = %self.model, "OpenAI generate_text");

        let data: OpenAiChatResponse = self.post(request, false).await?.json().await?;
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| CourierError::api(200, "No choices in OpenAI response"))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|tc| AgentToolCall {
                id: tc.id,
                name: tc.function.name,
                arguments: parse_arguments(tc.function.arguments),
            })
            .collect();

        let finish_reason = choice
            .finish_reason
            .as_deref()
            .and_then(parse_finish_reason);

        Ok(ProviderResponse {
            text: choice.message.content.unwrap_or_default(),
            usage: data.usage.map(Usage::from).unwrap_or_default(),
            tool_calls,
            finish_reason,
        })
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, CourierError>>, CourierError> {
        debug!(model = %self.model, "OpenAI stream_text");

        let byte_stream = self.post(request, true).await?.bytes_stream();

        let stream = async_stream::stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut pending: BTreeMap<u32, PartialToolCall> = BTreeMap::new();
            let mut finish_reason = None;
            let mut usage = None;
            let mut failed = false;
            futures::pin_mut!(byte_stream);

            while let Some(chunk_result) = byte_stream.next().await {
                let chunk = match chunk_result {
                    Ok(c) => c,
                    Err(e) => {
                        yield Err(CourierError::Network(e));
                        failed = true;
                        break;
                    }
                };

                buffer.extend_from_slice(&chunk);

                while let Some(raw) = take_line(&mut buffer) {
                    let Ok(line) = std::str::from_utf8(&raw) else {
                        warn!("skipping SSE line that is not valid UTF-8");
                        continue;
                    };
                    let line = line.trim();
                    if line.is_empty() || line.starts_with(':') {
                        continue;
                    }

                    let Some(data) = parse_sse_data(line) else {
                        continue;
                    };
                    // skip unparseable chunks
                    let Ok(chunk) = serde_json::from_str::<OpenAiStreamChunk>(data) else {
                        continue;
                    };

                    if let Some(u) = chunk.usage {
                        usage = Some(Usage::from(u));
                    }

                    for choice in chunk.choices {
                        if let Some(text) = choice.delta.content.filter(|t| !t.is_empty()) {
                            yield Ok(TextStreamDelta::text(text));
                        }
                        for fragment in choice.delta.tool_calls.unwrap_or_default() {
                            pending.entry(fragment.index).or_default().absorb(fragment);
                        }
                        if let Some(reason) = choice.finish_reason.as_deref() {
                            finish_reason = parse_finish_reason(reason);
                            for (_, partial) in std::mem::take(&mut pending) {
                                yield Ok(TextStreamDelta::tool_call(partial.finish()));
                            }
                        }
                    }
                }
            }

            if !failed {
                // Some servers close the stream without a finish_reason.
                for (_, partial) in std::mem::take(&mut pending) {
                    yield Ok(TextStreamDelta::tool_call(partial.finish()));
                }
                yield Ok(TextStreamDelta::done(finish_reason, usage));
            }
        };

        Ok(Box::pin(stream))
    }
}

/// Tool call reassembled from streamed fragments.
#[derive(Default)]
struct PartialToolCall {
    id: String,
    name: String,
    arguments: String,
}

impl PartialToolCall {
    fn absorb(&mut self, fragment: OpenAiStreamToolCall) {
        if let Some(id) = fragment.id {
            self.id = id;
        }
        if let Some(function) = fragment.function {
            if let Some(name) = function.name {
                self.name.push_str(&name);
            }
            if let Some(args) = function.arguments {
                self.arguments.push_str(&args);
            }
        }
    }

    fn finish(self) -> AgentToolCall {
        AgentToolCall {
            id: self.id,
            name: self.name,
            arguments: parse_arguments(self.arguments),
        }
    }
}

fn parse_arguments(raw: String) -> serde_json::Value {
    if raw.trim().is_empty() {
        return serde_json::json!({});
    }
    serde_json::from_str(&raw).unwrap_or(serde_json::Value::String(raw))
}

fn parse_finish_reason(s: &str) -> Option<FinishReason> {
    match s {
        "stop" => Some(FinishReason::Stop),
        "length" => Some(FinishReason::Length),
        "tool_calls" | "function_call" => Some(FinishReason::ToolCalls),
        "content_filter" => Some(FinishReason::ContentFilter),
        _ => None,
    }
}

fn message_to_openai(msg: &ModelMessage) -> serde_json::Value {
    let role = match msg.role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
        Role::Tool => "tool",
    };

    if let [ContentPart::ToolResult(ref tr)] = msg.content[..] {
        let content = match &tr.result {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        return serde_json::json!({
            "role": "tool",
            "tool_call_id": tr.tool_call_id,
            "content": content,
        });
    }

    let tool_calls = msg.tool_calls();
    if !tool_calls.is_empty() {
        let tc_json: Vec<serde_json::Value> = tool_calls
            .iter()
            .map(|tc| {
                serde_json::json!({
                    "id": tc.id,
                    "type": "function",
                    "function": {
                        "name": tc.name,
                        "arguments": tc.arguments.to_string(),
                    }
                })
            })
            .collect();
        let text = msg.text();
        return serde_json::json!({
            "role": role,
            "content": if text.is_empty() { serde_json::Value::Null } else { serde_json::Value::String(text) },
            "tool_calls": tc_json,
        });
    }

    serde_json::json!({ "role": role, "content": msg.text() })
}

// OpenAI API response types (internal)

#[derive(Deserialize)]
struct OpenAiChatResponse {
    choices: Vec<OpenAiChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiChoice {
    message: OpenAiMessage,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiMessage {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiToolCall {
    id: String,
    function: OpenAiFunction,
}

#[derive(Deserialize)]
struct OpenAiFunction {
    name: String,
    arguments: String,
}

#[derive(Deserialize)]
struct OpenAiUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

impl From<OpenAiUsage> for Usage {
    fn from(u: OpenAiUsage) -> Self {
        Usage {
            input_tokens: u.prompt_tokens,
            output_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }
    }
}

#[derive(Deserialize)]
struct OpenAiStreamChunk {
    #[serde(default)]
    choices: Vec<OpenAiStreamChoice>,
    usage: Option<OpenAiUsage>,
}

#[derive(Deserialize)]
struct OpenAiStreamChoice {
    delta: OpenAiStreamDelta,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct OpenAiStreamDelta {
    content: Option<String>,
    tool_calls: Option<Vec<OpenAiStreamToolCall>>,
}

#[derive(Deserialize)]
struct OpenAiStreamToolCall {
    #[serde(default)]
    index: u32,
    id: Option<String>,
    function: Option<OpenAiStreamFunction>,
}

#[derive(Deserialize)]
struct OpenAiStreamFunction {
    name: Option<String>,
    arguments: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> OpenAiProvider {
        OpenAiProvider::new("gpt-4o".into(), "sk-test".into(), None)
    }

    fn request(messages: Vec<ModelMessage>) -> ProviderRequest {
        ProviderRequest {
            messages,
            settings: GenerationSettings::default(),
            tools: None,
            response_format: None,
        }
    }

    #[test]
    fn body_includes_schema_response_format() {
        let mut req = request(vec![ModelMessage::user("hi")]);
        req.response_format = Some(ResponseFormat::JsonSchema {
            schema: serde_json::json!({"type": "object"}),
            name: "email".into(),
        });
        let body = provider().build_request_body(&req, false);
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "email");
        assert!(body.get("stream_options").is_none());
    }

    #[test]
    fn streaming_body_requests_usage() {
        let body = provider().build_request_body(&request(vec![ModelMessage::user("hi")]), true);
        assert_eq!(body["stream"], true);
        assert_eq!(body["stream_options"]["include_usage"], true);
    }

    #[test]
    fn tool_messages_are_flattened() {
        let call = AgentToolCall {
            id: "call_1".into(),
            name: "use_connector_agent".into(),
            arguments: serde_json::json!({"task": "list emails"}),
        };
        let assistant = message_to_openai(&ModelMessage::assistant_tool_calls("", &[call]));
        assert!(assistant["content"].is_null());
        assert_eq!(assistant["tool_calls"][0]["function"]["name"], "use_connector_agent");

        let result = message_to_openai(&ModelMessage::tool_result(
            "call_1",
            serde_json::Value::String("3 emails".into()),
            false,
        ));
        assert_eq!(result["role"], "tool");
        assert_eq!(result["content"], "3 emails");
    }

    #[test]
    fn partial_tool_calls_reassemble() {
        let mut partial = PartialToolCall::default();
        partial.absorb(OpenAiStreamToolCall {
            index: 0,
            id: Some("call_9".into()),
            function: Some(OpenAiStreamFunction {
                name: Some("think".into()),
                arguments: Some("{\"thought\":".into()),
            }),
        });
        partial.absorb(OpenAiStreamToolCall {
            index: 0,
            id: None,
            function: Some(OpenAiStreamFunction {
                name: None,
                arguments: Some("\"plan\"}".into()),
            }),
        });
        let call = partial.finish();
        assert_eq!(call.id, "call_9");
        assert_eq!(call.name, "think");
        assert_eq!(call.arguments["thought"], "plan");
    }
}
