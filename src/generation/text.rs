//! Text generation with tool loop.

use tracing::{debug, warn};

use crate::error::CourierError;
use crate::provider::{ModelProvider, ProviderRequest};
use crate::tools::{ToolArguments, ToolExecutionContext, ToolSet};
use crate::types::*;

/// Maximum tool loop iterations to prevent infinite loops.
pub const MAX_TOOL_ITERATIONS: usize = 20;

/// Generate text with an optional tool loop.
///
/// If the model returns tool calls, they are executed and fed back
/// until the model produces a final text response or we hit the iteration limit.
pub async fn generate_text(
    provider: &dyn ModelProvider,
    mut messages: Vec<ModelMessage>,
    settings: GenerationSettings,
    tools: &ToolSet,
) -> Result<GenerateTextResult, CourierError> {
    let tool_defs = tools.definitions();
    let mut steps = Vec::new();
    let mut total_usage = Usage::default();

    for iteration in 0..MAX_TOOL_ITERATIONS {
        let request = ProviderRequest {
            messages: messages.clone(),
            settings: settings.clone(),
            tools: tool_defs.clone(),
            response_format: settings.response_format.clone(),
        };

        debug!(iteration, "generate_text: calling provider");
        let response = provider.generate_text(&request).await?;
        total_usage.merge(&response.usage);

        let mut step = GenerationStep {
            text: response.text.clone(),
            tool_calls: response.tool_calls.clone(),
            tool_results: Vec::new(),
            usage: response.usage,
            finish_reason: response.finish_reason,
        };

        if response.tool_calls.is_empty() {
            steps.push(step);
            return Ok(GenerateTextResult {
                text: response.text,
                steps,
                messages,
                usage: total_usage,
                finish_reason: response.finish_reason,
            });
        }

        messages.push(ModelMessage::assistant_tool_calls(
            &response.text,
            &response.tool_calls,
        ));
        for call in &response.tool_calls {
            let result = execute_tool_call(tools, call).await;
            messages.push(ModelMessage::tool_result(
                result.tool_call_id.clone(),
                result.result.clone(),
                result.is_error,
            ));
            step.tool_results.push(result);
        }
        steps.push(step);
    }

    warn!(limit = MAX_TOOL_ITERATIONS, "tool loop hit iteration limit");
    let last_text = steps.last().map(|s| s.text.clone()).unwrap_or_default();
    Ok(GenerateTextResult {
        text: last_text,
        steps,
        messages,
        usage: total_usage,
        finish_reason: Some(FinishReason::Length),
    })
}

/// Run one tool call. Unknown tools and tool errors become error results for the model.
pub async fn execute_tool_call(tools: &ToolSet, call: &AgentToolCall) -> AgentToolResult {
    let Some(tool) = tools.get(&call.name) else {
        warn!(tool = %call.name, "Tool not found");
        return AgentToolResult {
            tool_call_id: call.id.clone(),
            result: serde_json::json!({ "error": format!("Tool '{}' not found", call.name) }),
            is_error: true,
        };
    };

    let args = ToolArguments::new(call.arguments.clone());
    let ctx = ToolExecutionContext::for_call(call.id.clone());
    match tool.execute(&args, &ctx).await {
        Ok(result) => AgentToolResult {
            tool_call_id: call.id.clone(),
            result,
            is_error: false,
        },
        Err(e) => {
            warn!(tool = %call.name, error = %e, "Tool execution failed");
            AgentToolResult {
                tool_call_id: call.id.clone(),
                result: serde_json::json!({ "error": e.to_string() }),
                is_error: true,
            }
        }
    }
}
