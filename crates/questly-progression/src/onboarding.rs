//! First-run profile creation.
//!
//! Onboarding walks through three steps (name, goal, optional picture). The
//! goal is sent to the AI gateway for a breakdown; [`OnboardingDraft::finish`]
//! turns the draft plus whatever suggestions came back into the starting
//! profile and board.

use chrono::{DateTime, Utc};
use questly_types::{
    RankName, RankStanding, RankTier, SuggestedTask, Task, TaskCategory, TaskDifficulty, TaskId,
    ThemeSettings, UserProfile,
};

use crate::error::ProgressionError;
use crate::tasks::difficulty_xp;

/// Difficulty of every quest seeded from the onboarding goal.
const INITIAL_DIFFICULTY: TaskDifficulty = TaskDifficulty::Hard;

/// Answers collected during onboarding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingDraft {
    /// Display name.
    pub name: String,
    /// The user's first big goal.
    pub goal: String,
    /// Uploaded or captured picture, if any.
    pub picture: Option<String>,
}

impl OnboardingDraft {
    /// Start a draft with the required fields.
    pub fn new(name: impl Into<String>, goal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            goal: goal.into(),
            picture: None,
        }
    }

    /// Attach a picture URL or data URI.
    #[must_use]
    pub fn with_picture(mut self, picture: impl Into<String>) -> Self {
        self.picture = Some(picture.into());
        self
    }

    /// Check that name and goal are filled in.
    pub fn validate(&self) -> Result<(), ProgressionError> {
        if self.name.trim().is_empty() {
            return Err(ProgressionError::MissingField("name"));
        }
        if self.goal.trim().is_empty() {
            return Err(ProgressionError::MissingField("goal"));
        }
        Ok(())
    }

    /// Build the starting profile and one Hard study quest per suggestion.
    pub fn finish(
        self,
        suggestions: &[SuggestedTask],
        now: DateTime<Utc>,
    ) -> Result<(UserProfile, Vec<Task>), ProgressionError> {
        self.validate()?;
        let name = self.name.trim().to_owned();
        let profile_picture = self
            .picture
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| format!("https://picsum.photos/seed/{name}/200"));

        let user = UserProfile {
            name,
            xp: 0,
            level: 1,
            streak: 0,
            total_completed: 0,
            profile_picture,
            onboarding_complete: true,
            rank_xp: 0,
            current_rank: RankName::Iron,
            current_tier: RankTier::Four,
            highest_rank: RankStanding::LOWEST,
            settings: ThemeSettings::default(),
        };

        let tasks = suggestions
            .iter()
            .filter(|s| !s.title.trim().is_empty())
            .map(|s| Task {
                id: TaskId::new(),
                title: s.title.clone(),
                description: (!s.description.is_empty()).then(|| s.description.clone()),
                category: TaskCategory::Study,
                difficulty: INITIAL_DIFFICULTY,
                is_completed: false,
                due_date: now,
                created_at: now,
                completed_at: None,
                xp_value: difficulty_xp(INITIAL_DIFFICULTY),
                is_ai_generated: true,
                sub_tasks: Vec::new(),
            })
            .collect();

        Ok((user, tasks))
    }
}
