//! Error types for the model gateway.
//!
//! Every gateway call returns one of these; the caller decides which static
//! fallback to substitute.

use std::time::Duration;

/// Errors that can occur while talking to a generative model.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No backend is configured (offline mode).
    #[error("AI gateway unavailable: no API key configured")]
    Unavailable,

    /// The backend returned an error or was unreachable.
    #[error("LLM backend error: {0}")]
    Backend(String),

    /// The call exceeded the client-side deadline.
    #[error("timeout: model call exceeded {0:?}")]
    Timeout(Duration),

    /// A prompt template failed to load or render.
    #[error("template render error: {0}")]
    Template(String),

    /// The response text could not be turned into the expected payload.
    #[error("response parse error: {0}")]
    Parse(String),

    /// Configuration is invalid.
    #[error("config error: {0}")]
    Config(String),

    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
}
