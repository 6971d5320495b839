//! Remote task execution against the hosted connector service.

pub mod http;

pub use http::{HttpTaskExecutor, CONNECTIONS_PATH, DEFAULT_TASK_PATH};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CourierError;

/// Executes a natural-language instruction remotely and returns its textual output.
///
/// Implementations block (await) until the service answers; no retries.
#[async_trait]
pub trait RemoteTaskExecutor: Send + Sync {
    async fn execute(&self, instruction: &str) -> Result<String, CourierError>;
}

/// Lists the connections (authorized integrations) available to the caller.
#[async_trait]
pub trait ConnectionDirectory: Send + Sync {
    async fn list_connections(&self) -> Result<serde_json::Value, CourierError>;
}

/// Which connectors the remote service may use. `"*"` in `allowed` means all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectorSelection {
    pub allowed: Vec<String>,
    #[serde(default)]
    pub excluded: Vec<String>,
}

impl Default for ConnectorSelection {
    fn default() -> Self {
        Self::all()
    }
}

impl ConnectorSelection {
    pub fn all() -> Self {
        Self {
            allowed: vec!["*".to_string()],
            excluded: Vec::new(),
        }
    }

    /// Allow only the named connectors.
    pub fn only<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: names.into_iter().map(Into::into).collect(),
            excluded: Vec::new(),
        }
    }

    pub fn excluding<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.excluded.extend(names.into_iter().map(Into::into));
        self
    }

    /// Whether a connector may be used. Exclusions win over the allow list.
    pub fn permits(&self, connector: &str) -> bool {
        if self.excluded.iter().any(|c| c.eq_ignore_ascii_case(connector)) {
            return false;
        }
        self.allowed
            .iter()
            .any(|c| c == "*" || c.eq_ignore_ascii_case(connector))
    }
}
