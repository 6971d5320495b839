//! Tool system for function calling.

pub mod arguments;
pub mod builtin;
pub mod delegation;
pub mod tool;
pub mod types;

pub use arguments::ToolArguments;
pub use delegation::{DelegationTool, DELEGATION_TOOL_NAME};
pub use tool::{AgentTool, Tool, ToolExecutionContext, ToolSet};
pub use types::AgentToolParameters;
