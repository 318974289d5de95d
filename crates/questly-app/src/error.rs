//! Error types for the Questly application layer.
//!
//! [`AppError`] wraps every subsystem error so session operations and the
//! CLI can propagate with `?`.

use questly_gateway::GatewayError;
use questly_progression::ProgressionError;
use questly_store::StoreError;

use crate::config::ConfigError;

/// Top-level application error.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: ConfigError,
    },

    /// A quest, rank or mastery rule was violated.
    #[error("{source}")]
    Progression {
        /// The underlying rule violation.
        #[from]
        source: ProgressionError,
    },

    /// The gateway could not be constructed.
    #[error("gateway error: {source}")]
    Gateway {
        /// The underlying gateway error.
        #[from]
        source: GatewayError,
    },

    /// Persisting the snapshot failed.
    #[error("store error: {source}")]
    Store {
        /// The underlying store error.
        #[from]
        source: StoreError,
    },

    /// The operation needs a finished onboarding.
    #[error("onboarding has not been completed yet")]
    NotOnboarded,

    /// No mastery challenge is pending.
    #[error("no mastery challenge is pending")]
    NoMasteryChallenge,

    /// A command argument could not be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
