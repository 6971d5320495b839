//! Streaming text generation with a tool loop.

use std::sync::Arc;

use futures::stream::BoxStream;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::error::CourierError;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::tools::ToolSet;
use crate::types::*;

use super::text::{execute_tool_call, MAX_TOOL_ITERATIONS};

/// Event produced by [`stream_text_with_tools`].
#[derive(Debug, Clone)]
pub enum StreamEvent {
    /// A text fragment of the assistant's answer.
    Text(String),
    /// A tool finished; its result has been fed back to the model.
    ToolResult {
        call: AgentToolCall,
        result: AgentToolResult,
    },
    /// The loop finished. `messages` is the full transcript including the final answer.
    Finished {
        text: String,
        messages: Vec<ModelMessage>,
        usage: Usage,
        finish_reason: Option<FinishReason>,
    },
}

/// Stream a response, running requested tools between model turns.
///
/// Text fragments are yielded as they arrive. The stream is finite: it ends
/// after one `Finished` event, or after the first error.
pub fn stream_text_with_tools(
    provider: Arc<dyn ModelProvider>,
    mut messages: Vec<ModelMessage>,
    settings: GenerationSettings,
    tools: ToolSet,
) -> BoxStream<'static, Result<StreamEvent, CourierError>> {
    let stream = async_stream::stream! {
        let tool_defs = tools.definitions();
        let mut total_usage = Usage::default();

        for iteration in 0..MAX_TOOL_ITERATIONS {
            let request = ProviderRequest {
                messages: messages.clone(),
                settings: settings.clone(),
                tools: tool_defs.clone(),
                response_format: settings.response_format.clone(),
            };

            debug!(iteration, "stream_text_with_tools: calling provider");
            let inner = match provider.stream_text(&request).await {
                Ok(s) => s,
                Err(e) => {
                    yield Err(e);
                    return;
                }
            };

            let mut text = String::new();
            let mut calls = Vec::new();
            let mut finish_reason = None;
            let mut failed = None;
            futures::pin_mut!(inner);

            while let Some(delta) = inner.next().await {
                let delta = match delta {
                    Ok(d) => d,
                    Err(e) => {
                        failed = Some(e);
                        break;
                    }
                };
                match delta.event_type {
                    StreamEventType::TextDelta => {
                        if !delta.text.is_empty() {
                            text.push_str(&delta.text);
                            yield Ok(StreamEvent::Text(delta.text));
                        }
                    }
                    StreamEventType::ToolCallDelta => calls.extend(delta.tool_call),
                    StreamEventType::Done => {
                        if let Some(u) = delta.usage.as_ref() {
                            total_usage.merge(u);
                        }
                        finish_reason = delta.finish_reason;
                    }
                }
            }

            if let Some(e) = failed {
                yield Err(e);
                return;
            }

            if calls.is_empty() {
                messages.push(ModelMessage::assistant(text.clone()));
                yield Ok(StreamEvent::Finished {
                    text,
                    messages,
                    usage: total_usage,
                    finish_reason,
                });
                return;
            }

            messages.push(ModelMessage::assistant_tool_calls(&text, &calls));
            for call in calls {
                let result = execute_tool_call(&tools, &call).await;
                messages.push(ModelMessage::tool_result(
                    result.tool_call_id.clone(),
                    result.result.clone(),
                    result.is_error,
                ));
                yield Ok(StreamEvent::ToolResult { call, result });
            }
        }

        warn!(limit = MAX_TOOL_ITERATIONS, "streaming tool loop hit iteration limit");
        yield Ok(StreamEvent::Finished {
            text: String::new(),
            messages,
            usage: total_usage,
            finish_reason: Some(FinishReason::Length),
        });
    };

    Box::pin(stream)
}
