//! Delegation adapter: the remote task executor exposed as a tool.
//!
//! Remote failures never escape this module as errors. They come back as
//! [`TaskResult::Error`] values carrying [`DELEGATION_ERROR_PREFIX`].
//!
//! [`DELEGATION_ERROR_PREFIX`]: crate::types::DELEGATION_ERROR_PREFIX

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::arguments::ToolArguments;
use super::tool::{Tool, ToolExecutionContext};
use super::types::AgentToolParameters;
use crate::error::CourierError;
use crate::executor::RemoteTaskExecutor;
use crate::types::{Task, TaskResult};
use crate::util::timeout::with_timeout;

/// Name the orchestrating agent calls this tool by.
pub const DELEGATION_TOOL_NAME: &str = "use_connector_agent";

const DELEGATION_TOOL_DESCRIPTION: &str = "Use the connector agent to perform tasks on connected \
services like Gmail, GitHub, etc. Pass the complete task in natural language, e.g. \
\"List 5 recent emails from Gmail\". Returns the result of the task.";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

/// Forwards instructions verbatim to a [`RemoteTaskExecutor`], single attempt.
#[derive(Clone)]
pub struct DelegationTool {
    executor: Arc<dyn RemoteTaskExecutor>,
    timeout: Duration,
    parameters: AgentToolParameters,
}

impl DelegationTool {
    pub fn new(executor: Arc<dyn RemoteTaskExecutor>) -> Self {
        Self {
            executor,
            timeout: DEFAULT_TIMEOUT,
            parameters: AgentToolParameters::object()
                .string(
                    "task",
                    "The task to perform, e.g. \"List 5 recent emails from Gmail\"",
                    true,
                )
                .build(),
        }
    }

    /// Bound each remote call. An elapsed call is reported like any other failure.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run a task remotely. Never fails: errors become error-valued results.
    pub async fn invoke(&self, task: &Task) -> TaskResult {
        debug!(task_id = ?task.id(), "invoking delegated agent");
        let call = self.executor.execute(task.instruction());
        match with_timeout(self.timeout, call).await {
            Ok(output) => TaskResult::success(output),
            Err(e) => {
                warn!(task_id = ?task.id(), error = %e, category = ?e.category(), "delegated task failed");
                TaskResult::delegation_error(e)
            }
        }
    }

    /// Convenience for callers holding a bare instruction string.
    pub async fn invoke_instruction(&self, instruction: &str) -> Result<TaskResult, CourierError> {
        let task = Task::new(instruction)?;
        Ok(self.invoke(&task).await)
    }
}

impl std::fmt::Debug for DelegationTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DelegationTool")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[async_trait]
impl Tool for DelegationTool {
    fn name(&self) -> &str {
        DELEGATION_TOOL_NAME
    }

    fn description(&self) -> &str {
        DELEGATION_TOOL_DESCRIPTION
    }

    fn parameters(&self) -> &AgentToolParameters {
        &self.parameters
    }

    async fn execute(
        &self,
        args: &ToolArguments,
        _ctx: &ToolExecutionContext,
    ) -> Result<serde_json::Value, CourierError> {
        let result = self.invoke_instruction(args.get_str("task")?).await?;
        Ok(serde_json::Value::String(result.text().to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Scripted(Result<&'static str, &'static str>);

    #[async_trait]
    impl RemoteTaskExecutor for Scripted {
        async fn execute(&self, _instruction: &str) -> Result<String, CourierError> {
            self.0
                .map(ToString::to_string)
                .map_err(|m| CourierError::api(500, m))
        }
    }

    struct Hanging;

    #[async_trait]
    impl RemoteTaskExecutor for Hanging {
        async fn execute(&self, _instruction: &str) -> Result<String, CourierError> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok("never".into())
        }
    }

    #[tokio::test]
    async fn success_output_is_returned_verbatim() {
        let tool = DelegationTool::new(Arc::new(Scripted(Ok("Starred 3 emails."))));
        let result = tool.invoke(&Task::new("star emails").unwrap()).await;
        assert_eq!(result, TaskResult::success("Starred 3 emails."));
    }

    #[tokio::test]
    async fn executor_failure_becomes_prefixed_error() {
        let tool = DelegationTool::new(Arc::new(Scripted(Err("upstream exploded"))));
        let result = tool.invoke(&Task::new("star emails").unwrap()).await;
        assert!(result.is_error());
        assert!(result.text().starts_with("Error using delegated agent: "));
        assert!(result.text().contains("upstream exploded"));
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_becomes_error_result() {
        let tool = DelegationTool::new(Arc::new(Hanging)).with_timeout(Duration::from_secs(5));
        let result = tool.invoke(&Task::new("slow").unwrap()).await;
        assert!(result.is_error());
        assert!(result.text().contains("Timeout after 5000ms"));
    }

    #[tokio::test]
    async fn tool_call_without_task_argument_is_rejected() {
        let tool = DelegationTool::new(Arc::new(Scripted(Ok("ok"))));
        let err = tool
            .execute(&ToolArguments::new(serde_json::json!({})), &ToolExecutionContext::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CourierError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn tool_call_returns_result_text() {
        let tool = DelegationTool::new(Arc::new(Scripted(Err("nope"))));
        let value = tool
            .execute(
                &ToolArguments::new(serde_json::json!({"task": "list emails"})),
                &ToolExecutionContext::default(),
            )
            .await
            .unwrap();
        assert_eq!(value, serde_json::json!("Error using delegated agent: API error (status 500): nope"));
    }
}
