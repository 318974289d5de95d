//! The quest board.
//!
//! Quests are kept newest first. The board never touches XP itself: edits
//! that should move progression return the signed delta, and the caller
//! feeds it to [`apply_xp`](crate::xp::apply_xp).

use chrono::{DateTime, Utc};
use questly_types::{
    SubTask, SubTaskId, SuggestedTask, Task, TaskCategory, TaskDifficulty, TaskId,
};
use tracing::debug;

use crate::SUB_TASK_XP;
use crate::error::ProgressionError;

/// XP added to an AI quest per breakdown step.
pub const BREAKDOWN_XP_PER_STEP: u32 = 10;

/// Base XP for a difficulty.
pub const fn difficulty_xp(difficulty: TaskDifficulty) -> u32 {
    match difficulty {
        TaskDifficulty::Easy => 25,
        TaskDifficulty::Hard => 100,
        TaskDifficulty::ExtremelyHard => 250,
    }
}

/// Fields supplied when creating a quest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewTask {
    /// Title, must not be blank.
    pub title: String,
    /// Optional description.
    pub description: Option<String>,
    /// Category.
    pub category: TaskCategory,
    /// Difficulty, which fixes the base XP.
    pub difficulty: TaskDifficulty,
    /// Due date.
    pub due_date: DateTime<Utc>,
}

/// Result of toggling a quest's completion flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskToggle {
    /// Signed XP to apply as a major delta.
    pub delta: i64,
    /// True when the quest was just completed.
    pub completing: bool,
    /// Title of the toggled quest.
    pub title: String,
}

/// Ordered collection of quests.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskBoard {
    tasks: Vec<Task>,
}

impl TaskBoard {
    /// Wrap quests loaded from the store.
    pub const fn from_tasks(tasks: Vec<Task>) -> Self {
        Self { tasks }
    }

    /// Borrow all quests, newest first.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Hand the quests back for persistence.
    pub fn into_tasks(self) -> Vec<Task> {
        self.tasks
    }

    /// Look up a quest.
    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Number of completed quests on the board.
    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.is_completed).count()
    }

    fn build(new: NewTask, now: DateTime<Utc>, ai: bool) -> Result<Task, ProgressionError> {
        let title = new.title.trim();
        if title.is_empty() {
            return Err(ProgressionError::EmptyTitle);
        }
        Ok(Task {
            id: TaskId::new(),
            title: String::from(title),
            description: new.description.filter(|d| !d.trim().is_empty()),
            category: new.category,
            difficulty: new.difficulty,
            is_completed: false,
            due_date: new.due_date,
            created_at: now,
            completed_at: None,
            xp_value: difficulty_xp(new.difficulty),
            is_ai_generated: ai,
            sub_tasks: Vec::new(),
        })
    }

    /// Create a manual quest at the front of the board.
    pub fn add_task(&mut self, new: NewTask, now: DateTime<Utc>) -> Result<TaskId, ProgressionError> {
        let task = Self::build(new, now, false)?;
        let id = task.id;
        self.insert_front(task);
        Ok(id)
    }

    /// Create an AI quest whose breakdown arrives later via
    /// [`attach_breakdown`](Self::attach_breakdown).
    pub fn add_ai_quest(
        &mut self,
        new: NewTask,
        now: DateTime<Utc>,
    ) -> Result<TaskId, ProgressionError> {
        let task = Self::build(new, now, true)?;
        let id = task.id;
        self.insert_front(task);
        Ok(id)
    }

    /// Append one sub-task per suggestion and raise the quest's XP by
    /// [`BREAKDOWN_XP_PER_STEP`] each. Returns the number of steps added.
    pub fn attach_breakdown(
        &mut self,
        id: TaskId,
        suggestions: &[SuggestedTask],
    ) -> Result<usize, ProgressionError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ProgressionError::TaskNotFound(id))?;
        if suggestions.is_empty() {
            return Ok(0);
        }
        let steps = u32::try_from(suggestions.len()).unwrap_or(u32::MAX);
        task.xp_value = task
            .xp_value
            .saturating_add(steps.saturating_mul(BREAKDOWN_XP_PER_STEP));
        task.sub_tasks.extend(suggestions.iter().map(|s| SubTask {
            id: SubTaskId::new(),
            title: s.title.clone(),
            is_completed: false,
        }));
        debug!(task = %id, steps, xp = task.xp_value, "breakdown attached");
        Ok(suggestions.len())
    }

    /// Flip a quest's completion flag.
    pub fn toggle_task(
        &mut self,
        id: TaskId,
        now: DateTime<Utc>,
    ) -> Result<TaskToggle, ProgressionError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(ProgressionError::TaskNotFound(id))?;
        let completing = !task.is_completed;
        task.is_completed = completing;
        task.completed_at = completing.then_some(now);
        let xp = i64::from(task.xp_value);
        Ok(TaskToggle {
            delta: if completing { xp } else { -xp },
            completing,
            title: task.title.clone(),
        })
    }

    /// Flip a sub-task and return the minor XP delta (+5 or -5).
    pub fn toggle_sub_task(
        &mut self,
        task_id: TaskId,
        sub_task_id: SubTaskId,
    ) -> Result<i64, ProgressionError> {
        let task = self
            .tasks
            .iter_mut()
            .find(|t| t.id == task_id)
            .ok_or(ProgressionError::TaskNotFound(task_id))?;
        let sub = task
            .sub_tasks
            .iter_mut()
            .find(|s| s.id == sub_task_id)
            .ok_or(ProgressionError::SubTaskNotFound {
                task: task_id,
                sub_task: sub_task_id,
            })?;
        sub.is_completed = !sub.is_completed;
        Ok(if sub.is_completed {
            SUB_TASK_XP
        } else {
            -SUB_TASK_XP
        })
    }

    /// Remove a quest. No XP is refunded or revoked.
    pub fn delete_task(&mut self, id: TaskId) -> Result<Task, ProgressionError> {
        let pos = self
            .tasks
            .iter()
            .position(|t| t.id == id)
            .ok_or(ProgressionError::TaskNotFound(id))?;
        Ok(self.tasks.remove(pos))
    }

    /// Drop every completed quest. Returns how many were removed.
    pub fn clear_completed(&mut self) -> usize {
        let before = self.tasks.len();
        self.tasks.retain(|t| !t.is_completed);
        before.saturating_sub(self.tasks.len())
    }

    /// Drop completed quests other than `keep`.
    pub fn prune_completed_except(&mut self, keep: TaskId) {
        self.tasks.retain(|t| !t.is_completed || t.id == keep);
    }

    /// Put a quest at the top of the board.
    pub fn insert_front(&mut self, task: Task) {
        self.tasks.insert(0, task);
    }

    /// Case-insensitive match on title or description. A blank query
    /// matches everything.
    pub fn search(&self, query: &str) -> Vec<&Task> {
        let needle = query.trim().to_lowercase();
        self.tasks
            .iter()
            .filter(|t| {
                needle.is_empty()
                    || t.title.to_lowercase().contains(&needle)
                    || t
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(&needle))
            })
            .collect()
    }
}
