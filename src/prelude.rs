//! Convenience re-exports for common use.

pub use crate::agent::{Agent, AgentResponse};
pub use crate::config::CourierConfig;
pub use crate::email::{AgentEmailAssistant, EmailAssistant};
pub use crate::error::{CourierError, Result};
pub use crate::executor::{ConnectorSelection, HttpTaskExecutor, RemoteTaskExecutor};
pub use crate::extract::{Extractor, HeuristicEmailExtractor};
pub use crate::provider::ModelProvider;
pub use crate::shell::{LineSource, Responder, Shell, ThreadedLines};
pub use crate::tools::{AgentTool, AgentToolParameters, DelegationTool, Tool, ToolArguments};
pub use crate::types::{
    BatchEntry, EmailReference, ExtractedInfo, GenerationSettings, ModelMessage, Task, TaskId,
    TaskResult, WorkflowOutcome,
};
pub use crate::workflow::{run_batch, WorkflowDriver};
