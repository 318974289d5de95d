//! Static values substituted when a gateway call fails.
//!
//! The gateway itself never falls back; callers pass its result through
//! [`resolve`] with the matching default from this module.

use questly_types::{MasteryChallenge, SuggestedTask};
use tracing::warn;

use crate::error::GatewayError;

/// Nudge shown when the model cannot be reached.
pub const NUDGE: &str = "Consistency is the path to mastery.";

/// Assistant reply shown when the model cannot be reached.
pub const CHAT_REPLY: &str =
    "I'm currently recalibrating my data nodes. Please try messaging me again in a moment.";

/// A task breakdown that failed yields no steps.
pub const fn suggestions() -> Vec<SuggestedTask> {
    Vec::new()
}

/// A challenge with no questions and a generic review quest.
pub fn mastery_challenge() -> MasteryChallenge {
    MasteryChallenge {
        questions: Vec::new(),
        next_quest: SuggestedTask {
            title: String::from("Knowledge Review"),
            description: String::from("Review what you just learned deeply."),
            category: String::from("Other"),
        },
    }
}

/// Unwrap a gateway result, logging and substituting `fallback` on error.
pub fn resolve<T>(call: &str, result: Result<T, GatewayError>, fallback: impl FnOnce() -> T) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(call, error = %e, "AI call failed, using fallback");
            fallback()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn ok_passes_through() {
        let value = resolve("progress_nudge", Ok(String::from("Nice!")), || NUDGE.to_owned());
        assert_eq!(value, "Nice!");
    }

    #[test]
    fn timeout_yields_fallback() {
        let value = resolve(
            "progress_nudge",
            Err(GatewayError::Timeout(Duration::from_secs(8))),
            || NUDGE.to_owned(),
        );
        assert_eq!(value, "Consistency is the path to mastery.");
    }

    #[test]
    fn fallback_challenge_has_review_quest() {
        let challenge = mastery_challenge();
        assert!(challenge.questions.is_empty());
        assert_eq!(challenge.next_quest.title, "Knowledge Review");
        assert_eq!(challenge.next_quest.category, "Other");
        assert!(suggestions().is_empty());
    }
}
