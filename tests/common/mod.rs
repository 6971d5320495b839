//! Shared test helpers: mock provider, executor, and email assistant.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use futures::stream::BoxStream;

use courier::email::EmailAssistant;
use courier::error::CourierError;
use courier::executor::RemoteTaskExecutor;
use courier::provider::{ModelProvider, ProviderRequest, ProviderResponse};
use courier::types::*;

fn usage(input: u32, output: u32) -> Usage {
    Usage {
        input_tokens: input,
        output_tokens: output,
        total_tokens: input + output,
    }
}

/// A provider that replays queued responses and records every request.
pub struct MockProvider {
    model_id: String,
    responses: Mutex<VecDeque<ProviderResponse>>,
    requests: Mutex<Vec<ProviderRequest>>,
}

impl MockProvider {
    pub fn new(model_id: &str) -> Self {
        Self {
            model_id: model_id.to_string(),
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Queue a final text answer.
    pub fn queue_response(&self, text: &str) {
        self.responses.lock().unwrap().push_back(ProviderResponse {
            text: text.to_string(),
            usage: usage(10, 20),
            tool_calls: vec![],
            finish_reason: Some(FinishReason::Stop),
        });
    }

    /// Queue a turn that asks for one tool call.
    pub fn queue_tool_call(&self, id: &str, name: &str, args: serde_json::Value) {
        self.responses.lock().unwrap().push_back(ProviderResponse {
            text: String::new(),
            usage: usage(10, 5),
            tool_calls: vec![AgentToolCall {
                id: id.to_string(),
                name: name.to_string(),
                arguments: args,
            }],
            finish_reason: Some(FinishReason::ToolCalls),
        });
    }

    pub fn requests(&self) -> Vec<ProviderRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, request: &ProviderRequest) -> ProviderResponse {
        self.requests.lock().unwrap().push(request.clone());
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| ProviderResponse {
                text: "Mock response".to_string(),
                usage: Usage::default(),
                tool_calls: vec![],
                finish_reason: Some(FinishReason::Stop),
            })
    }
}

#[async_trait]
impl ModelProvider for MockProvider {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_id(&self) -> &str {
        &self.model_id
    }

    async fn generate_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<ProviderResponse, CourierError> {
        Ok(self.next(request))
    }

    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, CourierError>>, CourierError> {
        let response = self.next(request);

        let stream = async_stream::stream! {
            for chunk in response.text.chars().collect::<Vec<_>>().chunks(5) {
                yield Ok(TextStreamDelta::text(chunk.iter().collect::<String>()));
            }
            for call in response.tool_calls {
                yield Ok(TextStreamDelta::tool_call(call));
            }
            yield Ok(TextStreamDelta::done(response.finish_reason, Some(response.usage)));
        };

        Ok(Box::pin(stream))
    }
}

/// Executor that answers from a script and records the instructions it saw.
///
/// Instructions containing `"fail"` are rejected with a 500.
#[derive(Default)]
pub struct MockExecutor {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<String>>,
}

impl MockExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the output for the next successful call. Unscripted calls echo the instruction.
    pub fn reply_with(self, output: &str) -> Self {
        self.replies.lock().unwrap().push_back(output.to_string());
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteTaskExecutor for MockExecutor {
    async fn execute(&self, instruction: &str) -> Result<String, CourierError> {
        self.calls.lock().unwrap().push(instruction.to_string());
        if instruction.contains("fail") {
            return Err(CourierError::api(500, "connector agent crashed"));
        }
        Ok(self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| format!("done: {instruction}")))
    }
}

pub fn sample_email(sender: &str) -> EmailReference {
    EmailReference {
        message_id: "msg-42".to_string(),
        thread_id: "thread-7".to_string(),
        references: None,
        in_reply_to: None,
        subject: "Weekly sync".to_string(),
        body: "Agenda attached.".to_string(),
        sender: sender.to_string(),
    }
}

/// Email assistant that returns canned data and records lookups and replies.
#[derive(Default)]
pub struct MockEmailAssistant {
    fail_lookup: bool,
    lookups: Mutex<Vec<String>>,
    replies: Mutex<Vec<(String, String)>>,
}

impl MockEmailAssistant {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail_lookup: true,
            ..Self::default()
        }
    }

    pub fn lookups(&self) -> Vec<String> {
        self.lookups.lock().unwrap().clone()
    }

    /// `(message id replied to, body)` pairs.
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl EmailAssistant for MockEmailAssistant {
    async fn find_email(&self, address: &str) -> Result<EmailReference, CourierError> {
        self.lookups.lock().unwrap().push(address.to_string());
        if self.fail_lookup {
            return Err(CourierError::api(503, "mailbox unavailable"));
        }
        Ok(sample_email(address))
    }

    async fn reply_to_email(
        &self,
        email: &EmailReference,
        body: &str,
    ) -> Result<String, CourierError> {
        self.replies
            .lock()
            .unwrap()
            .push((email.reply_target_id().to_string(), body.to_string()));
        Ok(format!("Replied on {}", email.thread_id))
    }
}
