//! Delegated tasks and their outcomes.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::email::EmailReference;
use crate::error::{CourierError, Result};

/// Prefix carried by every error message produced by the delegation adapter.
pub const DELEGATION_ERROR_PREFIX: &str = "Error using delegated agent: ";

/// Id reported for batch tasks submitted without one.
pub const UNKNOWN_TASK_ID: &str = "unknown";

/// Identifier used to track a task inside a batch.
///
/// Deserializes from either a JSON string or a number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TaskId(String);

impl TaskId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn unknown() -> Self {
        Self(UNKNOWN_TASK_ID.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for TaskId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for TaskId {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Text(String),
            Number(serde_json::Number),
        }

        Ok(match Raw::deserialize(deserializer)? {
            Raw::Text(s) => Self(s),
            Raw::Number(n) => Self(n.to_string()),
        })
    }
}

/// A natural-language instruction, optionally tagged for batch tracking.
///
/// Fields are private: a task cannot change once issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTask")]
pub struct Task {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<TaskId>,
    instruction: String,
}

#[derive(Deserialize)]
struct RawTask {
    #[serde(default)]
    id: Option<TaskId>,
    instruction: String,
}

impl TryFrom<RawTask> for Task {
    type Error = CourierError;

    fn try_from(raw: RawTask) -> Result<Self> {
        let task = Task::new(raw.instruction)?;
        Ok(match raw.id {
            Some(id) => Task { id: Some(id), ..task },
            None => task,
        })
    }
}

impl Task {
    /// Create an untagged task. Empty or whitespace-only instructions are rejected.
    pub fn new(instruction: impl Into<String>) -> Result<Self> {
        let instruction = instruction.into();
        if instruction.trim().is_empty() {
            return Err(CourierError::InvalidArgument(
                "task instruction must not be empty".into(),
            ));
        }
        Ok(Self {
            id: None,
            instruction,
        })
    }

    /// Create a task tagged with a batch id.
    pub fn with_id(id: impl Into<TaskId>, instruction: impl Into<String>) -> Result<Self> {
        let task = Self::new(instruction)?;
        Ok(Self {
            id: Some(id.into()),
            ..task
        })
    }

    pub fn id(&self) -> Option<&TaskId> {
        self.id.as_ref()
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }
}

/// Outcome of executing a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TaskResult {
    Success { output: String },
    Error { message: String },
}

impl TaskResult {
    pub fn success(output: impl Into<String>) -> Self {
        Self::Success {
            output: output.into(),
        }
    }

    /// An error result carrying [`DELEGATION_ERROR_PREFIX`].
    pub fn delegation_error(cause: impl fmt::Display) -> Self {
        Self::Error {
            message: format!("{DELEGATION_ERROR_PREFIX}{cause}"),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }

    /// The payload text, success output or error message alike.
    pub fn text(&self) -> &str {
        match self {
            Self::Success { output } => output,
            Self::Error { message } => message,
        }
    }
}

impl fmt::Display for TaskResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.text())
    }
}

/// Heuristically extracted fields, keyed by name. Best-effort; may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtractedInfo(BTreeMap<String, String>);

impl ExtractedInfo {
    pub const EMAIL_ADDRESS: &'static str = "email_address";
    pub const REPLY_BODY: &'static str = "reply_body";

    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.0.insert(key.into(), value.into());
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn email_address(&self) -> Option<&str> {
        self.get(Self::EMAIL_ADDRESS)
    }

    pub fn reply_body(&self) -> Option<&str> {
        self.get(Self::REPLY_BODY)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

/// Aggregated result of a multi-step workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowOutcome {
    /// Result of the delegated task (may be error-valued).
    pub delegated: TaskResult,
    /// Email found by the chained lookup, if an address was extracted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<EmailReference>,
    /// Confirmation from the chained reply, if one was sent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply: Option<String>,
}

impl WorkflowOutcome {
    pub fn delegated_only(delegated: TaskResult) -> Self {
        Self {
            delegated,
            email: None,
            reply: None,
        }
    }
}

/// One element of a batch run, paired with the task it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchEntry {
    pub id: TaskId,
    pub result: TaskResult,
}
