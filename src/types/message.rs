//! Chat transcript types shared by the providers and the tool loops.

use serde::{Deserialize, Serialize};

/// One entry of the transcript sent to the model.
///
/// Plain turns carry a single text part. Inside a tool loop an assistant
/// entry may also carry the calls it asked for, and each executed call is
/// answered by a `Tool` entry holding its result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMessage {
    pub role: Role,
    pub content: Vec<ContentPart>,
}

impl ModelMessage {
    fn from_parts(role: Role, content: Vec<ContentPart>) -> Self {
        Self { role, content }
    }

    fn plain(role: Role, text: impl Into<String>) -> Self {
        Self::from_parts(role, vec![ContentPart::Text { text: text.into() }])
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::plain(Role::System, text)
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::plain(Role::User, text)
    }

    pub fn assistant(text: impl Into<String>) -> Self {
        Self::plain(Role::Assistant, text)
    }

    /// The answer to one tool call, matched to it by `tool_call_id`.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        result: serde_json::Value,
        is_error: bool,
    ) -> Self {
        Self::from_parts(
            Role::Tool,
            vec![ContentPart::ToolResult(AgentToolResult {
                tool_call_id: tool_call_id.into(),
                result,
                is_error,
            })],
        )
    }

    /// Assistant turn that stopped to call tools. Any text the model produced
    /// before the calls is kept in front of them.
    pub fn assistant_tool_calls(text: &str, calls: &[AgentToolCall]) -> Self {
        let preamble = (!text.is_empty()).then(|| ContentPart::Text {
            text: text.to_string(),
        });
        let content = preamble
            .into_iter()
            .chain(calls.iter().cloned().map(ContentPart::ToolCall))
            .collect();
        Self::from_parts(Role::Assistant, content)
    }

    /// All text parts joined together; tool parts are skipped.
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn tool_calls(&self) -> Vec<&AgentToolCall> {
        self.content
            .iter()
            .filter_map(|part| match part {
                ContentPart::ToolCall(call) => Some(call),
                _ => None,
            })
            .collect()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ToolCall(AgentToolCall),
    ToolResult(AgentToolResult),
}

/// A tool invocation the model asked for, e.g. `use_connector_agent` with a `task`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentToolCall {
    pub id: String,
    pub name: String,
    pub arguments: serde_json::Value,
}

/// What a tool returned. Delegation failures arrive here as ordinary text,
/// so `is_error` is only set when the tool itself could not run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AgentToolResult {
    pub tool_call_id: String,
    pub result: serde_json::Value,
    #[serde(default)]
    pub is_error: bool,
}
