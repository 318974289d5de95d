//! Rank, XP and quest-board logic for the Questly quest tracker.
//!
//! Everything in this crate is synchronous and side-effect free: state goes
//! in by value (or by `&mut` for the task board) and comes back out together
//! with the events a caller should surface. Persistence, the AI gateway and
//! notifications live in other crates.
//!
//! # Modules
//!
//! - [`rank`] -- Rank XP to (major rank, sub-tier, absolute ordinal).
//! - [`level`] -- Level derivation from cumulative XP.
//! - [`xp`] -- The XP mutation handler, [`apply_xp`].
//! - [`history`] -- Seven-day rolling completion log.
//! - [`tasks`] -- The quest board: create, toggle, break down, prune.
//! - [`stats`] -- Completion rate and average completion time.
//! - [`mastery`] -- Post-completion quiz flow.
//! - [`onboarding`] -- First-run profile creation.
//!
//! [`apply_xp`]: xp::apply_xp

pub mod error;
pub mod history;
pub mod level;
pub mod mastery;
pub mod onboarding;
pub mod rank;
pub mod stats;
pub mod tasks;
pub mod xp;

pub use error::ProgressionError;
pub use history::WeeklyHistory;
pub use mastery::{MasteryReward, MasterySession};
pub use onboarding::OnboardingDraft;
pub use rank::{RankStatus, ordinal_from_label, rank_status};
pub use tasks::{NewTask, TaskBoard, TaskToggle};
pub use xp::{Progress, ProgressEvent, XpDelta, XpKind, XpOutcome, apply_xp};

/// Cumulative XP per level.
pub const LEVEL_SIZE: u32 = 500;

/// Rank XP per sub-tier.
pub const TIER_SIZE: u32 = 100;

/// Sub-tiers in each major rank.
pub const TIERS_PER_RANK: u32 = 4;

/// Major ranks on the ladder.
pub const NUMBER_OF_MAJOR_RANKS: u32 = 7;

/// XP swing of toggling a single sub-task.
pub const SUB_TASK_XP: i64 = 5;

/// Bonus XP for finishing a mastery challenge.
pub const MASTERY_BONUS_XP: i64 = 100;
