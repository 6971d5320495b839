//! Error types for Courier.

use thiserror::Error;

use crate::types::TaskResult;

/// Primary error type for all Courier operations.
#[derive(Error, Debug)]
pub enum CourierError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Timeout after {0}ms")]
    Timeout(u64),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Tool execution error: {tool_name}: {message}")]
    ToolExecution { tool_name: String, message: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// An email follow-up failed after the delegated step had already run.
    #[error("{source} (delegated step returned: {})", .delegated.text())]
    FollowUp {
        delegated: TaskResult,
        source: Box<CourierError>,
    },
}

/// Broad error category, used for log fields and exit reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Timeout,
    Server,
    Api,
    Configuration,
    Serialization,
    ToolExecution,
    Unknown,
}

impl CourierError {
    /// Create an API error.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    pub fn follow_up(delegated: TaskResult, source: CourierError) -> Self {
        Self::FollowUp {
            delegated,
            source: Box::new(source),
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) => ErrorCategory::Network,
            Self::Timeout(_) => ErrorCategory::Timeout,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::ToolExecution { .. } => ErrorCategory::ToolExecution,
            Self::FollowUp { source, .. } => source.category(),
            _ => ErrorCategory::Unknown,
        }
    }

    /// Whether this error should stop the process rather than be reported and skipped.
    pub fn is_fatal(&self) -> bool {
        matches!(self.category(), ErrorCategory::Configuration)
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, CourierError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_status_maps_to_category() {
        assert_eq!(CourierError::api(401, "nope").category(), ErrorCategory::Authentication);
        assert_eq!(CourierError::api(429, "slow").category(), ErrorCategory::RateLimit);
        assert_eq!(CourierError::api(503, "down").category(), ErrorCategory::Server);
        assert_eq!(CourierError::api(400, "bad").category(), ErrorCategory::Api);
    }

    #[test]
    fn only_configuration_errors_are_fatal() {
        assert!(CourierError::Configuration("PICA_SECRET".into()).is_fatal());
        assert!(!CourierError::Timeout(10).is_fatal());
        assert!(!CourierError::InvalidArgument("empty".into()).is_fatal());
    }
}
