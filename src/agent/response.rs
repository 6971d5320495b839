//! Agent output: a lazy fragment stream, or a complete value.

use std::io::Write;

use futures::stream::BoxStream;
use futures::StreamExt;

use crate::error::CourierError;

/// What an agent turn produces.
///
/// `Streaming` is finite and can be consumed once. Callers drain it fully
/// before moving on.
pub enum AgentResponse {
    Streaming(BoxStream<'static, Result<String, CourierError>>),
    Complete(String),
}

impl AgentResponse {
    /// Wait for the whole response text.
    pub async fn collect(self) -> Result<String, CourierError> {
        match self {
            Self::Complete(text) => Ok(text),
            Self::Streaming(mut fragments) => {
                let mut text = String::new();
                while let Some(fragment) = fragments.next().await {
                    text.push_str(&fragment?);
                }
                Ok(text)
            }
        }
    }

    /// Write fragments to `out` as they arrive (flushing after each), returning the full text.
    pub async fn drain_into<W: Write>(self, out: &mut W) -> Result<String, CourierError> {
        match self {
            Self::Complete(text) => {
                out.write_all(text.as_bytes())?;
                out.flush()?;
                Ok(text)
            }
            Self::Streaming(mut fragments) => {
                let mut text = String::new();
                while let Some(fragment) = fragments.next().await {
                    let fragment = fragment?;
                    out.write_all(fragment.as_bytes())?;
                    out.flush()?;
                    text.push_str(&fragment);
                }
                Ok(text)
            }
        }
    }
}

impl std::fmt::Debug for AgentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Streaming(_) => f.write_str("AgentResponse::Streaming(..)"),
            Self::Complete(text) => f.debug_tuple("AgentResponse::Complete").field(text).finish(),
        }
    }
}
