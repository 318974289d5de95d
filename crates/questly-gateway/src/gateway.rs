//! The [`AiGateway`] trait and its implementations.
//!
//! Every call is bounded by a fixed client-side deadline. There is no retry
//! and no backoff: a slow or failing call returns an error straight away and
//! the caller substitutes a value from [`fallback`](crate::fallback).
//!
//! - [`LlmGateway`] renders a prompt, calls the configured backend under
//!   the deadline and parses the reply.
//! - [`OfflineGateway`] fails every call with [`GatewayError::Unavailable`].
//! - [`Gateway`] dispatches between the two so the application can pick at
//!   startup.

use std::future::Future;
use std::time::Duration;

use questly_types::{ChatMessage, MasteryChallenge, SuggestedTask, WebSource};
use tracing::{debug, warn};

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::llm::{Completion, LlmBackend, create_backend};
use crate::parse::{parse_mastery, parse_suggestions, parse_text};
use crate::prompt::{PromptEngine, RenderedPrompt};

/// An assistant reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    /// Reply text.
    pub text: String,
    /// Model that produced it.
    pub model_used: String,
    /// Web pages the reply was grounded on.
    pub sources: Vec<WebSource>,
}

/// Source of AI-generated content.
pub trait AiGateway {
    /// Break `goal` into 3-5 actionable steps.
    fn suggest_tasks(
        &self,
        goal: &str,
    ) -> impl Future<Output = Result<Vec<SuggestedTask>, GatewayError>> + Send;

    /// Ten-question quiz on `topic` plus a follow-up quest.
    fn mastery_challenge(
        &self,
        topic: &str,
    ) -> impl Future<Output = Result<MasteryChallenge, GatewayError>> + Send;

    /// One-sentence encouragement given today's completion counts.
    fn progress_nudge(
        &self,
        completed: usize,
        total: usize,
    ) -> impl Future<Output = Result<String, GatewayError>> + Send;

    /// Reply to `message`. Implementations only send the most recent part
    /// of `history` as context.
    fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        personality: &str,
    ) -> impl Future<Output = Result<ChatReply, GatewayError>> + Send;
}

/// Run `fut` under `deadline`, mapping expiry to [`GatewayError::Timeout`].
pub async fn with_deadline<T, F>(deadline: Duration, fut: F) -> Result<T, GatewayError>
where
    F: Future<Output = Result<T, GatewayError>>,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result,
        Err(elapsed) => {
            warn!(?deadline, %elapsed, "AI call exceeded deadline");
            Err(GatewayError::Timeout(deadline))
        }
    }
}

// ---------------------------------------------------------------------------
// Live gateway
// ---------------------------------------------------------------------------

/// Gateway backed by a real model API.
pub struct LlmGateway {
    backend: LlmBackend,
    prompts: PromptEngine,
    timeout: Duration,
}

impl LlmGateway {
    /// Build the backend and load the prompt templates.
    pub fn new(config: &GatewayConfig) -> Result<Self, GatewayError> {
        let prompts = match &config.templates_dir {
            Some(dir) => PromptEngine::from_dir(dir, &config.assistant_name)?,
            None => PromptEngine::embedded(&config.assistant_name)?,
        };
        Ok(Self {
            backend: create_backend(&config.backend),
            prompts,
            timeout: config.timeout,
        })
    }

    /// Backend name for logging.
    pub const fn backend_name(&self) -> &str {
        self.backend.name()
    }

    async fn call(&self, call: &str, prompt: &RenderedPrompt) -> Result<Completion, GatewayError> {
        debug!(call, backend = self.backend.name(), "calling model");
        with_deadline(self.timeout, self.backend.complete(prompt)).await
    }
}

impl AiGateway for LlmGateway {
    async fn suggest_tasks(&self, goal: &str) -> Result<Vec<SuggestedTask>, GatewayError> {
        let prompt = self.prompts.suggest_tasks(goal)?;
        let raw = self.call("suggest_tasks", &prompt).await?.text;
        parse_suggestions(&raw)
    }

    async fn mastery_challenge(&self, topic: &str) -> Result<MasteryChallenge, GatewayError> {
        let prompt = self.prompts.mastery_challenge(topic)?;
        let raw = self.call("mastery_challenge", &prompt).await?.text;
        parse_mastery(&raw)
    }

    async fn progress_nudge(&self, completed: usize, total: usize) -> Result<String, GatewayError> {
        let prompt = self.prompts.progress_nudge(completed, total)?;
        let raw = self.call("progress_nudge", &prompt).await?.text;
        parse_text(&raw)
    }

    async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        personality: &str,
    ) -> Result<ChatReply, GatewayError> {
        let prompt = self.prompts.chat(message, history, personality)?;
        let completion = self.call("chat", &prompt).await?;
        Ok(ChatReply {
            text: parse_text(&completion.text)?,
            model_used: self.backend.model().to_owned(),
            sources: completion.sources,
        })
    }
}

// ---------------------------------------------------------------------------
// Offline gateway
// ---------------------------------------------------------------------------

/// Gateway used when no API key is configured. Every call fails with
/// [`GatewayError::Unavailable`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineGateway;

impl OfflineGateway {
    /// Create an offline gateway.
    pub const fn new() -> Self {
        Self
    }
}

impl AiGateway for OfflineGateway {
    async fn suggest_tasks(&self, _goal: &str) -> Result<Vec<SuggestedTask>, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn mastery_challenge(&self, _topic: &str) -> Result<MasteryChallenge, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn progress_nudge(&self, _completed: usize, _total: usize) -> Result<String, GatewayError> {
        Err(GatewayError::Unavailable)
    }

    async fn chat(
        &self,
        _message: &str,
        _history: &[ChatMessage],
        _personality: &str,
    ) -> Result<ChatReply, GatewayError> {
        Err(GatewayError::Unavailable)
    }
}

// ---------------------------------------------------------------------------
// Startup dispatch
// ---------------------------------------------------------------------------

/// Either a live or an offline gateway.
pub enum Gateway {
    /// Calls a real model.
    Llm(Box<LlmGateway>),
    /// Always unavailable.
    Offline(OfflineGateway),
}

impl Gateway {
    /// Live gateway when `config` is present, offline otherwise.
    pub fn from_config(config: Option<&GatewayConfig>) -> Result<Self, GatewayError> {
        match config {
            Some(config) => Ok(Self::Llm(Box::new(LlmGateway::new(config)?))),
            None => Ok(Self::Offline(OfflineGateway::new())),
        }
    }

    /// Short description for logging.
    pub fn describe(&self) -> &str {
        match self {
            Self::Llm(gateway) => gateway.backend_name(),
            Self::Offline(_) => "offline",
        }
    }
}

impl AiGateway for Gateway {
    async fn suggest_tasks(&self, goal: &str) -> Result<Vec<SuggestedTask>, GatewayError> {
        match self {
            Self::Llm(g) => g.suggest_tasks(goal).await,
            Self::Offline(g) => g.suggest_tasks(goal).await,
        }
    }

    async fn mastery_challenge(&self, topic: &str) -> Result<MasteryChallenge, GatewayError> {
        match self {
            Self::Llm(g) => g.mastery_challenge(topic).await,
            Self::Offline(g) => g.mastery_challenge(topic).await,
        }
    }

    async fn progress_nudge(&self, completed: usize, total: usize) -> Result<String, GatewayError> {
        match self {
            Self::Llm(g) => g.progress_nudge(completed, total).await,
            Self::Offline(g) => g.progress_nudge(completed, total).await,
        }
    }

    async fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        personality: &str,
    ) -> Result<ChatReply, GatewayError> {
        match self {
            Self::Llm(g) => g.chat(message, history, personality).await,
            Self::Offline(g) => g.chat(message, history, personality).await,
        }
    }
}
