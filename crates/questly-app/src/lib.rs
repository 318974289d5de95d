//! Application layer for the Questly quest tracker.
//!
//! Wires the progression rules, the AI gateway and the store into a single
//! [`QuestSession`], and exposes the `questly` command line on top of it.
//!
//! # Modules
//!
//! - [`cli`] -- clap argument structure and command dispatch.
//! - [`config`] -- YAML configuration with environment overrides.
//! - [`error`] -- [`AppError`].
//! - [`notify`] -- Expiring XP, rank and celebration notices.
//! - [`session`] -- [`QuestSession`] and the state it owns.

pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod session;

pub use config::{AppConfig, ConfigError};
pub use error::AppError;
pub use notify::{Notice, NoticeKind, NotificationBoard};
pub use session::{AppState, QuestSession};
