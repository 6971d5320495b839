//! Configuration loaded from the process environment (and `.env`, if present).

use std::fmt;
use std::time::Duration;

use crate::error::{CourierError, Result};
use crate::executor::ConnectorSelection;

/// Default connector service base URL.
pub const DEFAULT_SERVER_URL: &str = "https://development-api.picaos.com";
/// Default OpenAI-compatible API base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
/// Default chat model.
pub const DEFAULT_MODEL: &str = "gpt-4o";

const DEFAULT_TASK_TIMEOUT_SECS: u64 = 120;
const DEFAULT_HISTORY_RESPONSES: usize = 5;

/// Resolved configuration for the connector service and the LLM.
///
/// Built explicitly and passed into constructors. Resolution:
/// 1. `PICA_SECRET` is required; loading fails with [`CourierError::Configuration`] without it.
/// 2. Everything else falls back to the documented defaults.
#[derive(Clone)]
pub struct CourierConfig {
    secret: String,
    server_url: String,
    connectors: ConnectorSelection,
    openai_api_key: Option<String>,
    openai_base_url: String,
    model: String,
    task_timeout: Duration,
    history_responses: usize,
}

impl fmt::Debug for CourierConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CourierConfig")
            .field("secret", &"..")
            .field("server_url", &self.server_url)
            .field("connectors", &self.connectors)
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| ".."))
            .field("openai_base_url", &self.openai_base_url)
            .field("model", &self.model)
            .field("task_timeout", &self.task_timeout)
            .field("history_responses", &self.history_responses)
            .finish()
    }
}

impl CourierConfig {
    /// Create a config with the given secret and defaults for everything else.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            server_url: DEFAULT_SERVER_URL.to_string(),
            connectors: ConnectorSelection::default(),
            openai_api_key: None,
            openai_base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            task_timeout: Duration::from_secs(DEFAULT_TASK_TIMEOUT_SECS),
            history_responses: DEFAULT_HISTORY_RESPONSES,
        }
    }

    /// Load from environment variables, reading `.env` first if present.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let secret = lookup("PICA_SECRET")
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| {
                CourierError::Configuration("PICA_SECRET environment variable is not set".into())
            })?;

        let mut config = Self::new(secret);

        if let Some(url) = lookup("PICA_SERVER_URL").filter(|s| !s.trim().is_empty()) {
            config.server_url = url.trim_end_matches('/').to_string();
        }

        if let Some(list) = lookup("PICA_CONNECTORS") {
            let allowed = split_list(&list);
            if !allowed.is_empty() {
                config.connectors.allowed = allowed;
            }
        }
        if let Some(list) = lookup("PICA_EXCLUDED_CONNECTORS") {
            config.connectors.excluded = split_list(&list);
        }

        config.openai_api_key = lookup("OPENAI_API_KEY").filter(|s| !s.trim().is_empty());
        if let Some(url) = lookup("OPENAI_BASE_URL").filter(|s| !s.trim().is_empty()) {
            config.openai_base_url = url.trim_end_matches('/').to_string();
        }
        if let Some(model) = lookup("COURIER_MODEL").filter(|s| !s.trim().is_empty()) {
            config.model = model;
        }

        if let Some(raw) = lookup("COURIER_TASK_TIMEOUT_SECS") {
            let secs = raw
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|secs| *secs > 0)
                .ok_or_else(|| {
                    CourierError::Configuration(format!(
                        "COURIER_TASK_TIMEOUT_SECS must be a positive whole number of seconds, got '{raw}'"
                    ))
                })?;
            config.task_timeout = Duration::from_secs(secs);
        }
        if let Some(raw) = lookup("COURIER_HISTORY_RESPONSES") {
            config.history_responses = raw.trim().parse().map_err(|_| {
                CourierError::Configuration(format!(
                    "COURIER_HISTORY_RESPONSES must be a non-negative integer, got '{raw}'"
                ))
            })?;
        }

        Ok(config)
    }

    pub fn with_server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_connectors(mut self, connectors: ConnectorSelection) -> Self {
        self.connectors = connectors;
        self
    }

    pub fn with_openai_api_key(mut self, key: impl Into<String>) -> Self {
        self.openai_api_key = Some(key.into());
        self
    }

    pub fn with_openai_base_url(mut self, url: impl Into<String>) -> Self {
        self.openai_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_task_timeout(mut self, timeout: Duration) -> Self {
        self.task_timeout = timeout;
        self
    }

    pub fn with_history_responses(mut self, n: usize) -> Self {
        self.history_responses = n;
        self
    }

    pub fn secret(&self) -> &str {
        &self.secret
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    pub fn connectors(&self) -> &ConnectorSelection {
        &self.connectors
    }

    /// OpenAI API key, required as soon as an LLM-backed component is built.
    pub fn openai_api_key(&self) -> Result<&str> {
        self.openai_api_key
            .as_deref()
            .ok_or_else(|| CourierError::Configuration("Missing OPENAI_API_KEY".into()))
    }

    pub fn openai_base_url(&self) -> &str {
        &self.openai_base_url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn task_timeout(&self) -> Duration {
        self.task_timeout
    }

    pub fn history_responses(&self) -> usize {
        self.history_responses
    }
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}
