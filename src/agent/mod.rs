//! Agent system: multi-turn conversations with tool execution.

pub mod agent;
pub mod conversation;
pub mod response;

pub use agent::{Agent, ORCHESTRATOR_INSTRUCTIONS};
pub use conversation::{Conversation, DEFAULT_HISTORY_LIMIT};
pub use response::AgentResponse;
