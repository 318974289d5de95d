//! Mastery challenge flow.
//!
//! Completing a quest offers a ten-question quiz on its topic. The user can
//! accept or skip. Either way the challenge's follow-up quest is added to the
//! board as an "Effective" quest; finishing the quiz also pays a minor XP
//! bonus.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use questly_types::{
    MasteryChallenge, PracticeQuestion, SuggestedTask, Task, TaskCategory, TaskDifficulty, TaskId,
};

use crate::MASTERY_BONUS_XP;
use crate::error::ProgressionError;

/// XP value of a follow-up quest.
pub const EFFECTIVE_QUEST_XP: u32 = 150;

/// Build the follow-up quest for a challenge.
///
/// The model's category string is matched case-insensitively; anything
/// unrecognised becomes Study.
pub fn effective_quest(next: &SuggestedTask, now: DateTime<Utc>) -> Task {
    Task {
        id: TaskId::new(),
        title: format!("Effective: {}", next.title),
        description: (!next.description.is_empty()).then(|| next.description.clone()),
        category: TaskCategory::from_label(&next.category).unwrap_or_default(),
        difficulty: TaskDifficulty::Hard,
        is_completed: false,
        due_date: now,
        created_at: now,
        completed_at: None,
        xp_value: EFFECTIVE_QUEST_XP,
        is_ai_generated: true,
        sub_tasks: Vec::new(),
    }
}

/// Payout for a finished challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasteryReward {
    /// Minor XP bonus.
    pub bonus_xp: i64,
    /// Answers matching the expected option.
    pub correct: usize,
    /// Number of questions.
    pub total: usize,
    /// Follow-up quest to put at the front of the board.
    pub effective_quest: Task,
}

/// Progress through one mastery challenge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterySession {
    challenge: MasteryChallenge,
    accepted: bool,
    step: usize,
    answers: BTreeMap<usize, String>,
}

impl MasterySession {
    /// Wrap a freshly fetched challenge. The session starts at the prompt.
    pub const fn new(challenge: MasteryChallenge) -> Self {
        Self {
            challenge,
            accepted: false,
            step: 0,
            answers: BTreeMap::new(),
        }
    }

    /// The underlying challenge.
    pub const fn challenge(&self) -> &MasteryChallenge {
        &self.challenge
    }

    /// True until the user accepts.
    pub const fn is_prompted(&self) -> bool {
        !self.accepted
    }

    /// Zero-based index of the current question.
    pub const fn step(&self) -> usize {
        self.step
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.challenge.questions.len()
    }

    /// True when the model returned no questions.
    pub fn is_empty(&self) -> bool {
        self.challenge.questions.is_empty()
    }

    /// The question at the current step.
    pub fn current_question(&self) -> Option<&PracticeQuestion> {
        self.challenge.questions.get(self.step)
    }

    /// Answer recorded for the current step.
    pub fn current_answer(&self) -> Option<&str> {
        self.answers.get(&self.step).map(String::as_str)
    }

    /// True on the final question.
    pub fn is_last_step(&self) -> bool {
        self.step.saturating_add(1) >= self.len()
    }

    /// Leave the prompt and start the quiz.
    pub fn accept(&mut self) -> Result<(), ProgressionError> {
        if self.is_empty() {
            return Err(ProgressionError::NoQuestions);
        }
        self.accepted = true;
        Ok(())
    }

    /// Record (or replace) the answer to the current question.
    pub fn answer(&mut self, option: &str) -> Result<(), ProgressionError> {
        if !self.accepted {
            return Err(ProgressionError::NotAccepted);
        }
        let question = self
            .current_question()
            .ok_or(ProgressionError::NoQuestions)?;
        if !question.options.iter().any(|o| o == option) {
            return Err(ProgressionError::InvalidOption(option.to_owned()));
        }
        self.answers.insert(self.step, option.to_owned());
        Ok(())
    }

    /// Move to the next question once the current one is answered.
    pub fn advance(&mut self) -> Result<(), ProgressionError> {
        if !self.accepted {
            return Err(ProgressionError::NotAccepted);
        }
        if self.current_answer().is_none() {
            return Err(ProgressionError::Unanswered { step: self.step });
        }
        if self.is_last_step() {
            return Err(ProgressionError::LastStep);
        }
        self.step = self.step.saturating_add(1);
        Ok(())
    }

    /// Score the quiz and produce the reward.
    pub fn finish(self, now: DateTime<Utc>) -> Result<MasteryReward, ProgressionError> {
        if !self.accepted {
            return Err(ProgressionError::NotAccepted);
        }
        if let Some(step) = (0..self.len()).find(|i| !self.answers.contains_key(i)) {
            return Err(ProgressionError::Unanswered { step });
        }
        let correct = self
            .challenge
            .questions
            .iter()
            .enumerate()
            .filter(|(i, q)| self.answers.get(i) == Some(&q.correct_answer))
            .count();
        Ok(MasteryReward {
            bonus_xp: MASTERY_BONUS_XP,
            correct,
            total: self.len(),
            effective_quest: effective_quest(&self.challenge.next_quest, now),
        })
    }

    /// Abandon the quiz. The follow-up quest is still offered.
    pub fn skip(self, now: DateTime<Utc>) -> Task {
        effective_quest(&self.challenge.next_quest, now)
    }
}
