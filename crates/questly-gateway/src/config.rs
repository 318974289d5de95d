//! Gateway configuration types.
//!
//! The application crate fills these in from `questly-config.yaml` and the
//! environment; this crate only defines the shapes and backend defaults.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::GatewayError;

/// Default client-side deadline for every model call.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(8000);

/// Default display name of the assistant.
pub const DEFAULT_ASSISTANT_NAME: &str = "Dr. Rudhh";

/// Supported model API flavours.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendType {
    /// `OpenAI`-compatible chat completions (`OpenAI`, `DeepSeek`, Ollama).
    OpenAi,
    /// Anthropic Messages API.
    Anthropic,
    /// Google Gemini `generateContent`.
    Gemini,
}

impl BackendType {
    /// Parse a backend name as written in config or the environment.
    pub fn parse(name: &str) -> Result<Self, GatewayError> {
        match name.trim().to_lowercase().as_str() {
            "openai" | "deepseek" | "ollama" => Ok(Self::OpenAi),
            "anthropic" | "claude" => Ok(Self::Anthropic),
            "gemini" | "google" => Ok(Self::Gemini),
            other => Err(GatewayError::Config(format!("unknown backend type: {other}"))),
        }
    }

    /// Base URL used when none is configured.
    pub const fn default_api_url(self) -> &'static str {
        match self {
            Self::OpenAi => "https://api.openai.com/v1",
            Self::Anthropic => "https://api.anthropic.com/v1",
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
        }
    }

    /// Model used when none is configured.
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Anthropic => "claude-3-5-haiku-latest",
            Self::Gemini => "gemini-3-flash-preview",
        }
    }
}

/// Connection details for one model backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmBackendConfig {
    /// API flavour.
    pub backend_type: BackendType,
    /// Base API URL.
    pub api_url: String,
    /// API key.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
}

impl LlmBackendConfig {
    /// Config with the backend's default URL and model.
    pub fn with_defaults(backend_type: BackendType, api_key: impl Into<String>) -> Self {
        Self {
            backend_type,
            api_url: backend_type.default_api_url().to_owned(),
            api_key: api_key.into(),
            model: backend_type.default_model().to_owned(),
        }
    }
}

/// Everything [`LlmGateway`](crate::gateway::LlmGateway) needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// Backend to call.
    pub backend: LlmBackendConfig,
    /// Deadline applied to every call.
    pub timeout: Duration,
    /// Directory with prompt template overrides; embedded templates when
    /// `None`.
    pub templates_dir: Option<PathBuf>,
    /// Name the assistant introduces itself with.
    pub assistant_name: String,
}

impl GatewayConfig {
    /// Config with default timeout, embedded templates and assistant name.
    pub fn new(backend: LlmBackendConfig) -> Self {
        Self {
            backend,
            timeout: DEFAULT_TIMEOUT,
            templates_dir: None,
            assistant_name: DEFAULT_ASSISTANT_NAME.to_owned(),
        }
    }
}
