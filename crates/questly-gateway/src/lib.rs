//! Generative-model gateway for the Questly quest tracker.
//!
//! Turns the four AI features (task breakdown, mastery challenge, progress
//! nudge, assistant chat) into typed async calls with a fixed deadline.
//! Failures are returned, never hidden; [`fallback`] holds the static values
//! callers substitute.
//!
//! # Modules
//!
//! - [`config`] -- Backend selection, URLs, models, deadline.
//! - [`error`] -- [`GatewayError`].
//! - [`fallback`] -- Static fallback values and [`fallback::resolve`].
//! - [`gateway`] -- The [`AiGateway`] trait, [`LlmGateway`], [`OfflineGateway`].
//! - [`llm`] -- `OpenAI`-compatible, Anthropic and Gemini HTTP backends.
//! - [`parse`] -- Reply parsing with JSON recovery.
//! - [`prompt`] -- `minijinja` prompt templates.

pub mod config;
pub mod error;
pub mod fallback;
pub mod gateway;
pub mod llm;
pub mod parse;
pub mod prompt;

pub use config::{BackendType, GatewayConfig, LlmBackendConfig};
pub use error::GatewayError;
pub use gateway::{AiGateway, ChatReply, Gateway, LlmGateway, OfflineGateway, with_deadline};
