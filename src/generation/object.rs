//! Structured output: typed objects from model responses, tools allowed.

use serde::de::DeserializeOwned;

use crate::error::CourierError;
use crate::provider::ModelProvider;
use crate::tools::ToolSet;
use crate::types::*;

/// A parsed object plus the raw text it came from.
#[derive(Debug, Clone)]
pub struct GenerateObjectResult<T> {
    pub object: T,
    pub raw_text: String,
    pub usage: Usage,
}

/// Generate a typed object, letting the model call tools before it answers.
///
/// The final answer is constrained with a JSON Schema response format.
pub async fn generate_object<T: DeserializeOwned>(
    provider: &dyn ModelProvider,
    messages: Vec<ModelMessage>,
    mut settings: GenerationSettings,
    tools: &ToolSet,
    schema: serde_json::Value,
    type_name: &str,
) -> Result<GenerateObjectResult<T>, CourierError> {
    settings.response_format = Some(ResponseFormat::JsonSchema {
        schema,
        name: type_name.to_string(),
    });

    let result = super::text::generate_text(provider, messages, settings, tools).await?;
    let raw_text = result.text.trim().to_string();
    if raw_text.is_empty() {
        return Err(CourierError::InvalidState(format!(
            "model returned no {type_name} object"
        )));
    }

    let object: T = serde_json::from_str(strip_code_fences(&raw_text))?;

    Ok(GenerateObjectResult {
        object,
        raw_text,
        usage: result.usage,
    })
}

/// Strip markdown code fences around a JSON answer.
fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}
