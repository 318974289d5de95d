//! Error types for the questly-progression crate.
//!
//! XP and rank arithmetic is total and never fails; errors here come from
//! quest-board edits, the mastery flow and onboarding validation.

use questly_types::{SubTaskId, TaskId};

/// Errors that can occur while editing progression state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgressionError {
    /// A quest title was empty or whitespace.
    #[error("quest title must not be empty")]
    EmptyTitle,

    /// No quest with the given ID is on the board.
    #[error("task not found: {0}")]
    TaskNotFound(TaskId),

    /// The quest exists but has no sub-task with the given ID.
    #[error("sub-task {sub_task} not found in task {task}")]
    SubTaskNotFound {
        /// The quest that was searched.
        task: TaskId,
        /// The missing sub-task.
        sub_task: SubTaskId,
    },

    /// A required onboarding field was left blank.
    #[error("onboarding field must not be empty: {0}")]
    MissingField(&'static str),

    /// The mastery challenge came back without questions.
    #[error("mastery challenge has no questions")]
    NoQuestions,

    /// A mastery action was attempted before the challenge was accepted.
    #[error("mastery challenge has not been accepted")]
    NotAccepted,

    /// The chosen answer is not one of the current question's options.
    #[error("'{0}' is not an option for the current question")]
    InvalidOption(String),

    /// The current question (or an earlier one) has no answer yet.
    #[error("question {step} has not been answered")]
    Unanswered {
        /// Zero-based question index.
        step: usize,
    },

    /// `advance` was called on the last question.
    #[error("already at the last question")]
    LastStep,
}
