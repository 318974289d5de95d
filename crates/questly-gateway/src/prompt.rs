//! Prompt template loading and rendering via `minijinja`.
//!
//! The default templates are compiled into the binary. Operators can point
//! `templates_dir` at a directory holding files of the same names to tune
//! the wording without recompiling.

use std::path::Path;

use minijinja::{Environment, context};
use questly_types::{ChatMessage, ChatRole};

use crate::error::GatewayError;

/// Number of prior chat messages sent as context.
pub const CHAT_CONTEXT_MESSAGES: usize = 8;

/// Questions requested per mastery challenge.
pub const MASTERY_QUESTION_COUNT: usize = 10;

/// Token budget for short structured replies.
const SHORT_REPLY_TOKENS: u32 = 512;

/// Token budget for the ten-question challenge.
const LONG_REPLY_TOKENS: u32 = 4096;

const COACH_SYSTEM: &str = "coach_system.j2";
const SUGGEST_TASKS: &str = "suggest_tasks.j2";
const MASTERY_CHALLENGE: &str = "mastery_challenge.j2";
const PROGRESS_NUDGE: &str = "progress_nudge.j2";
const CHAT_SYSTEM: &str = "chat_system.j2";

/// Embedded defaults, name and source.
const EMBEDDED: [(&str, &str); 5] = [
    (COACH_SYSTEM, include_str!("../templates/coach_system.j2")),
    (SUGGEST_TASKS, include_str!("../templates/suggest_tasks.j2")),
    (MASTERY_CHALLENGE, include_str!("../templates/mastery_challenge.j2")),
    (PROGRESS_NUDGE, include_str!("../templates/progress_nudge.j2")),
    (CHAT_SYSTEM, include_str!("../templates/chat_system.j2")),
];

/// One prior turn of a conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTurn {
    /// Who spoke.
    pub role: ChatRole,
    /// What was said.
    pub text: String,
}

/// A prompt ready to send to a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPrompt {
    /// System instruction.
    pub system: String,
    /// Earlier conversation, oldest first.
    pub turns: Vec<PromptTurn>,
    /// The new user message.
    pub user: String,
    /// Ask the backend for a JSON response.
    pub expect_json: bool,
    /// Output token budget.
    pub max_tokens: u32,
    /// Let the backend ground its reply on a web search, where supported.
    pub web_search: bool,
}

/// Holds the prompt templates.
pub struct PromptEngine {
    env: Environment<'static>,
    assistant_name: String,
}

impl PromptEngine {
    /// Engine over the embedded templates.
    pub fn embedded(assistant_name: &str) -> Result<Self, GatewayError> {
        let mut env = Environment::new();
        for (name, source) in EMBEDDED {
            env.add_template(name, source)
                .map_err(|e| GatewayError::Template(format!("failed to add {name}: {e}")))?;
        }
        Ok(Self {
            env,
            assistant_name: assistant_name.to_owned(),
        })
    }

    /// Engine loading templates from `dir`.
    ///
    /// Every template must be present; a missing or invalid file fails here
    /// rather than on first use.
    pub fn from_dir(dir: &Path, assistant_name: &str) -> Result<Self, GatewayError> {
        let mut env = Environment::new();
        env.set_loader(minijinja::path_loader(dir));
        for (name, _) in EMBEDDED {
            env.get_template(name).map_err(|e| {
                GatewayError::Template(format!("failed to load {name} from {}: {e}", dir.display()))
            })?;
        }
        Ok(Self {
            env,
            assistant_name: assistant_name.to_owned(),
        })
    }

    fn render(&self, name: &str, ctx: &minijinja::Value) -> Result<String, GatewayError> {
        self.env
            .get_template(name)
            .map_err(|e| GatewayError::Template(format!("missing {name}: {e}")))?
            .render(ctx)
            .map(|s| s.trim().to_owned())
            .map_err(|e| GatewayError::Template(format!("{name} render failed: {e}")))
    }

    fn coach_system(&self, json: bool) -> Result<String, GatewayError> {
        self.render(
            COACH_SYSTEM,
            &context! { assistant_name => self.assistant_name, json => json },
        )
    }

    /// Prompt asking for a 3-5 step breakdown of `goal`.
    pub fn suggest_tasks(&self, goal: &str) -> Result<RenderedPrompt, GatewayError> {
        Ok(RenderedPrompt {
            system: self.coach_system(true)?,
            turns: Vec::new(),
            user: self.render(SUGGEST_TASKS, &context! { goal => goal })?,
            expect_json: true,
            max_tokens: SHORT_REPLY_TOKENS,
            web_search: false,
        })
    }

    /// Prompt asking for a mastery quiz on `topic` plus a follow-up quest.
    pub fn mastery_challenge(&self, topic: &str) -> Result<RenderedPrompt, GatewayError> {
        Ok(RenderedPrompt {
            system: self.coach_system(true)?,
            turns: Vec::new(),
            user: self.render(
                MASTERY_CHALLENGE,
                &context! { topic => topic, question_count => MASTERY_QUESTION_COUNT },
            )?,
            expect_json: true,
            max_tokens: LONG_REPLY_TOKENS,
            web_search: false,
        })
    }

    /// Prompt asking for a one-sentence nudge.
    pub fn progress_nudge(&self, completed: usize, total: usize) -> Result<RenderedPrompt, GatewayError> {
        Ok(RenderedPrompt {
            system: self.coach_system(false)?,
            turns: Vec::new(),
            user: self.render(
                PROGRESS_NUDGE,
                &context! { completed => completed, total => total },
            )?,
            expect_json: false,
            max_tokens: SHORT_REPLY_TOKENS,
            web_search: false,
        })
    }

    /// Chat prompt with the last [`CHAT_CONTEXT_MESSAGES`] of `history`.
    pub fn chat(
        &self,
        message: &str,
        history: &[ChatMessage],
        personality: &str,
    ) -> Result<RenderedPrompt, GatewayError> {
        let skip = history.len().saturating_sub(CHAT_CONTEXT_MESSAGES);
        let turns = history
            .iter()
            .skip(skip)
            .map(|m| PromptTurn {
                role: m.role,
                text: m.text.clone(),
            })
            .collect();
        Ok(RenderedPrompt {
            system: self.render(
                CHAT_SYSTEM,
                &context! { assistant_name => self.assistant_name, personality => personality },
            )?,
            turns,
            user: message.to_owned(),
            expect_json: false,
            max_tokens: LONG_REPLY_TOKENS,
            web_search: true,
        })
    }
}
