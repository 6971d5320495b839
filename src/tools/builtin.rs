//! Built-in tools for the orchestrating agent.
//!
//! - `think`: a scratchpad the model uses to reason step by step before acting.
//! - `list_connections`: shows which connector integrations are set up, so the
//!   agent can tell the user when a required connection is missing.
//!
//! Each tool is constructed via [`AgentTool::new`] and returned as `Arc<dyn Tool>`.

use std::sync::Arc;

use crate::executor::ConnectionDirectory;
use crate::tools::tool::{AgentTool, Tool, ToolExecutionContext};
use crate::tools::types::AgentToolParameters;

pub const THINK_TOOL_NAME: &str = "think";
pub const LIST_CONNECTIONS_TOOL_NAME: &str = "list_connections";

const CONNECTIONS_OUTPUT_MAX_BYTES: usize = 16_384;

fn truncate_utf8(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }

    let mut cutoff = max_bytes;
    while cutoff > 0 && !s.is_char_boundary(cutoff) {
        cutoff -= 1;
    }
    format!("{}... (truncated)", &s[..cutoff])
}

/// Create the `think` tool. Echoes the thought back; it has no side effects.
pub fn think_tool() -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        THINK_TOOL_NAME,
        "Think through the problem step by step before answering or calling another tool. \
         Use it to plan multi-step tasks and check intermediate results.",
        AgentToolParameters::object()
            .string("thought", "Your reasoning for this step", true)
            .build(),
        |args, _ctx: ToolExecutionContext| async move {
            let thought = args.get_str("thought")?;
            tracing::debug!(thought, "agent thought");
            Ok(serde_json::json!({ "thought": thought }))
        },
    ))
}

/// Create the `list_connections` tool backed by a connection directory.
///
/// Failures are returned as an `error` field so the model can relay them.
pub fn list_connections_tool(directory: Arc<dyn ConnectionDirectory>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        LIST_CONNECTIONS_TOOL_NAME,
        "List the connector integrations (e.g. Gmail, GitHub) that are currently set up. \
         Use this to check whether a required connection exists.",
        AgentToolParameters::empty(),
        move |_args, _ctx: ToolExecutionContext| {
            let directory = Arc::clone(&directory);
            async move {
                match directory.list_connections().await {
                    Ok(value) => {
                        let rendered = value.to_string();
                        if rendered.len() > CONNECTIONS_OUTPUT_MAX_BYTES {
                            Ok(serde_json::Value::String(truncate_utf8(
                                &rendered,
                                CONNECTIONS_OUTPUT_MAX_BYTES,
                            )))
                        } else {
                            Ok(value)
                        }
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "listing connections failed");
                        Ok(serde_json::json!({ "error": e.to_string() }))
                    }
                }
            }
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CourierError;
    use crate::tools::arguments::ToolArguments;
    use async_trait::async_trait;

    struct FixedDirectory(Option<serde_json::Value>);

    #[async_trait]
    impl ConnectionDirectory for FixedDirectory {
        async fn list_connections(&self) -> Result<serde_json::Value, CourierError> {
            self.0
                .clone()
                .ok_or_else(|| CourierError::Authentication("bad secret".into()))
        }
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let s = "héllo";
        assert_eq!(truncate_utf8(s, 2), "h... (truncated)");
        assert_eq!(truncate_utf8(s, 64), "héllo");
    }

    #[tokio::test]
    async fn think_echoes_thought() {
        let tool = think_tool();
        let out = tool
            .execute(
                &ToolArguments::new(serde_json::json!({"thought": "find the sender first"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(out["thought"], "find the sender first");
    }

    #[tokio::test]
    async fn list_connections_passes_listing_through() {
        let listing = serde_json::json!({"rows": [{"platform": "gmail"}]});
        let tool = list_connections_tool(Arc::new(FixedDirectory(Some(listing.clone()))));
        let out = tool
            .execute(&ToolArguments::new(serde_json::json!({})), &ToolExecutionContext::default())
            .await
            .unwrap();
        assert_eq!(out, listing);
    }

    #[tokio::test]
    async fn list_connections_reports_failure_as_data() {
        let tool = list_connections_tool(Arc::new(FixedDirectory(None)));
        let out = tool
            .execute(&ToolArguments::new(serde_json::json!({})), &ToolExecutionContext::default())
            .await
            .unwrap();
        assert!(out["error"].as_str().unwrap().contains("bad secret"));
    }
}
