//! HTTP client for the connector service's agent endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::CourierConfig;
use crate::error::CourierError;
use crate::provider::http::{connector_headers, shared_client, status_to_error};

use super::{ConnectionDirectory, ConnectorSelection, RemoteTaskExecutor};

/// Default path of the task endpoint, relative to the server URL.
pub const DEFAULT_TASK_PATH: &str = "/v1/agent/tasks";
/// Path listing the connections configured for the secret.
pub const CONNECTIONS_PATH: &str = "/v1/vault/connections";

/// Sends instructions to the connector service over HTTP.
pub struct HttpTaskExecutor {
    secret: String,
    server_url: String,
    task_path: String,
    connectors: ConnectorSelection,
}

impl std::fmt::Debug for HttpTaskExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTaskExecutor")
            .field("server_url", &self.server_url)
            .field("task_path", &self.task_path)
            .field("connectors", &self.connectors)
            .finish()
    }
}

#[derive(Serialize)]
struct TaskRequest<'a> {
    instruction: &'a str,
    connectors: &'a ConnectorSelection,
}

#[derive(Deserialize)]
struct TaskResponse {
    output: serde_json::Value,
}

impl HttpTaskExecutor {
    pub fn new(
        secret: impl Into<String>,
        server_url: impl Into<String>,
        connectors: ConnectorSelection,
    ) -> Self {
        Self {
            secret: secret.into(),
            server_url: server_url.into().trim_end_matches('/').to_string(),
            task_path: DEFAULT_TASK_PATH.to_string(),
            connectors,
        }
    }

    /// Build from resolved configuration.
    pub fn from_config(config: &CourierConfig) -> Self {
        Self::new(
            config.secret(),
            config.server_url(),
            config.connectors().clone(),
        )
    }

    /// Override the task endpoint path.
    pub fn with_task_path(mut self, path: impl Into<String>) -> Self {
        self.task_path = path.into();
        self
    }

    pub fn connectors(&self) -> &ConnectorSelection {
        &self.connectors
    }
}

#[async_trait]
impl ConnectionDirectory for HttpTaskExecutor {
    /// Connections available to this secret, filtered by the connector selection.
    async fn list_connections(&self) -> Result<serde_json::Value, CourierError> {
        let url = format!("{}{}", self.server_url, CONNECTIONS_PATH);
        debug!(%url, "listing connections");

        let resp = shared_client()
            .get(&url)
            .headers(connector_headers(&self.secret))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body));
        }

        let mut value: serde_json::Value = resp.json().await?;
        if let Some(rows) = value.get_mut("rows").and_then(|r| r.as_array_mut()) {
            rows.retain(|row| {
                row.get("platform")
                    .and_then(|p| p.as_str())
                    .map_or(true, |p| self.connectors.permits(p))
            });
        }
        Ok(value)
    }
}

#[async_trait]
impl RemoteTaskExecutor for HttpTaskExecutor {
    async fn execute(&self, instruction: &str) -> Result<String, CourierError> {
        let url = format!("{}{}", self.server_url, self.task_path);
        debug!(%url, "delegating task");

        let resp = shared_client()
            .post(&url)
            .headers(connector_headers(&self.secret))
            .json(&TaskRequest {
                instruction,
                connectors: &self.connectors,
            })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(status_to_error(status.as_u16(), &body));
        }

        let body: TaskResponse = resp.json().await?;
        Ok(match body.output {
            serde_json::Value::String(text) => text,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        })
    }
}
