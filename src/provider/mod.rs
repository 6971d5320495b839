//! Model provider trait and the OpenAI-compatible implementation.

pub mod http;
pub mod openai;

pub use openai::OpenAiProvider;

use async_trait::async_trait;
use futures::stream::BoxStream;

use crate::config::CourierConfig;
use crate::error::CourierError;
use crate::types::{
    message::AgentToolCall, FinishReason, GenerationSettings, ModelMessage, ResponseFormat,
    TextStreamDelta, Usage,
};

/// A request sent to a model provider.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    pub messages: Vec<ModelMessage>,
    pub settings: GenerationSettings,
    pub tools: Option<Vec<ToolDefinition>>,
    pub response_format: Option<ResponseFormat>,
}

/// Tool definition sent to the provider API.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

/// Response from a provider.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub text: String,
    pub usage: Usage,
    pub tool_calls: Vec<AgentToolCall>,
    pub finish_reason: Option<FinishReason>,
}

/// Core trait implemented by model providers.
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Provider name (e.g., "openai").
    fn provider_name(&self) -> &str;
    /// The model ID this provider instance serves.
    fn model_id(&self) -> &str;

    /// Generate text (non-streaming).
    async fn generate_text(&self, request: &ProviderRequest)
        -> Result<ProviderResponse, CourierError>;

    /// Generate text (streaming). Tool calls arrive as assembled `ToolCallDelta` events.
    async fn stream_text(
        &self,
        request: &ProviderRequest,
    ) -> Result<BoxStream<'static, Result<TextStreamDelta, CourierError>>, CourierError>;
}

/// Create the configured provider.
pub fn create_provider(config: &CourierConfig) -> Result<Box<dyn ModelProvider>, CourierError> {
    let api_key = config.openai_api_key()?;
    Ok(Box::new(OpenAiProvider::new(
        config.model().to_string(),
        api_key.to_string(),
        Some(config.openai_base_url().to_string()),
    )))
}
