//! Configuration loading and typed config structures.
//!
//! The configuration lives in `questly-config.yaml` next to the binary's
//! working directory. Every field has a default, so a missing file is not an
//! error. Environment variables override the file after parsing:
//!
//! | Variable | Field |
//! |----------|-------|
//! | `QUESTLY_API_KEY` | `llm.api_key` |
//! | `QUESTLY_LLM_BACKEND` | `llm.backend` |
//! | `QUESTLY_LLM_API_URL` | `llm.api_url` |
//! | `QUESTLY_LLM_MODEL` | `llm.model` |
//! | `QUESTLY_AI_TIMEOUT_MS` | `llm.timeout_ms` |
//! | `QUESTLY_STORE_PATH` | `store.path` |

use std::path::{Path, PathBuf};
use std::time::Duration;

use questly_gateway::config::DEFAULT_ASSISTANT_NAME;
use questly_gateway::{BackendType, GatewayConfig, LlmBackendConfig};
use serde::Deserialize;

/// Default config file name.
pub const CONFIG_FILE: &str = "questly-config.yaml";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// A value (from the file or an override) is not acceptable.
    #[error("invalid config value: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct AppConfig {
    /// Model gateway settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Local store settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Model gateway settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LlmConfig {
    /// Backend name (`gemini`, `openai`, `anthropic`, ...).
    #[serde(default = "default_backend")]
    pub backend: String,

    /// API key. Without one the gateway runs offline and every AI feature
    /// falls back to its static value.
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL; the backend's public endpoint when unset.
    #[serde(default)]
    pub api_url: Option<String>,

    /// Model identifier; the backend's default when unset.
    #[serde(default)]
    pub model: Option<String>,

    /// Client-side deadline for every call, in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Directory with prompt template overrides.
    #[serde(default)]
    pub templates_dir: Option<PathBuf>,

    /// Name the assistant introduces itself with.
    #[serde(default = "default_assistant_name")]
    pub assistant_name: String,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            api_key: None,
            api_url: None,
            model: None,
            timeout_ms: default_timeout_ms(),
            templates_dir: None,
            assistant_name: default_assistant_name(),
        }
    }
}

/// Local store settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Snapshot file; `null` keeps everything in memory.
    #[serde(default = "default_store_path")]
    pub path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a YAML file and apply environment overrides.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string and apply environment
    /// overrides.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = serde_yml::from_str(yaml)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Load `path` if it exists, defaults (plus overrides) otherwise.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides()?;
            Ok(config)
        }
    }

    /// Apply `QUESTLY_*` environment variables.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|name| std::env::var(name).ok())
    }

    /// Apply overrides from an arbitrary variable lookup.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(val) = lookup("QUESTLY_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Some(val) = lookup("QUESTLY_LLM_BACKEND") {
            self.llm.backend = val;
        }
        if let Some(val) = lookup("QUESTLY_LLM_API_URL") {
            self.llm.api_url = Some(val);
        }
        if let Some(val) = lookup("QUESTLY_LLM_MODEL") {
            self.llm.model = Some(val);
        }
        if let Some(val) = lookup("QUESTLY_AI_TIMEOUT_MS") {
            self.llm.timeout_ms = val.trim().parse().map_err(|e| {
                ConfigError::Invalid(format!("invalid QUESTLY_AI_TIMEOUT_MS '{val}': {e}"))
            })?;
        }
        if let Some(val) = lookup("QUESTLY_STORE_PATH") {
            self.store.path = (!val.trim().is_empty()).then(|| PathBuf::from(val));
        }
        Ok(())
    }

    /// Gateway settings, or `None` when no API key is configured.
    pub fn gateway_config(&self) -> Result<Option<GatewayConfig>, ConfigError> {
        let Some(api_key) = self.llm.api_key.as_ref().filter(|k| !k.trim().is_empty()) else {
            return Ok(None);
        };
        let backend_type = BackendType::parse(&self.llm.backend)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.llm.timeout_ms == 0 {
            return Err(ConfigError::Invalid(String::from(
                "llm.timeout_ms must be greater than zero",
            )));
        }

        let mut backend = LlmBackendConfig::with_defaults(backend_type, api_key.clone());
        if let Some(url) = &self.llm.api_url {
            backend.api_url.clone_from(url);
        }
        if let Some(model) = &self.llm.model {
            backend.model.clone_from(model);
        }

        Ok(Some(GatewayConfig {
            backend,
            timeout: Duration::from_millis(self.llm.timeout_ms),
            templates_dir: self.llm.templates_dir.clone(),
            assistant_name: self.llm.assistant_name.clone(),
        }))
    }
}

// ---------------------------------------------------------------------------
// Default value functions (serde default requires named functions)
// ---------------------------------------------------------------------------

fn default_backend() -> String {
    "gemini".to_owned()
}

const fn default_timeout_ms() -> u64 {
    8_000
}

fn default_assistant_name() -> String {
    DEFAULT_ASSISTANT_NAME.to_owned()
}

fn default_store_path() -> Option<PathBuf> {
    Some(PathBuf::from("questly-data.json"))
}

fn default_log_level() -> String {
    "info".to_owned()
}
