//! Core entity structs for the Questly quest tracker.
//!
//! Covers the user profile and its settings, quests with their sub-task
//! breakdowns, the weekly activity log, the assistant chat log, and the
//! payloads exchanged with the generative-model gateway.

use chrono::{DateTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{ChatRole, RankName, RankTier, TaskCategory, TaskDifficulty, ThemeColor};
use crate::ids::{MessageId, SubTaskId, TaskId};

/// Assistant personality assigned to new profiles.
pub const DEFAULT_PERSONALITY: &str =
    "Brilliant, supportive, and slightly eccentric academic mentor.";

/// Named assistant personalities offered in settings, label and prompt text.
pub const PERSONALITY_PRESETS: [(&str, &str); 4] = [
    ("Academic Mentor", DEFAULT_PERSONALITY),
    (
        "Strict Professor",
        "A no-nonsense, highly disciplined academic authority who demands excellence.",
    ),
    (
        "Sarcastic Genius",
        "Witty, sharp-tongued, but undeniably effective problem solver.",
    ),
    (
        "Empathetic Coach",
        "Gentle, motivating, and deeply focused on your mental well-being while studying.",
    ),
];

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// A position on the rank ladder together with its absolute ordinal.
///
/// The ordinal is stored next to the display parts so that comparisons never
/// depend on re-parsing a formatted label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RankStanding {
    /// Major rank.
    pub rank: RankName,
    /// Sub-tier within the major rank.
    pub tier: RankTier,
    /// Absolute rank ordinal (`rank_xp / 100` at the time it was reached).
    pub ordinal: u32,
}

impl RankStanding {
    /// The bottom of the ladder: Iron IV, ordinal 0.
    pub const LOWEST: Self = Self {
        rank: RankName::Iron,
        tier: RankTier::Four,
        ordinal: 0,
    };

    /// Recover a standing from a `"<Rank> <Tier>"` label.
    ///
    /// Used when importing data that only stored the display label. The
    /// ordinal is `rank_index * 4 + tier_index`; a label without a second
    /// token yields ordinal 0, and an unknown token counts as index 0.
    pub fn from_label(label: &str) -> Self {
        let mut tokens = label.split_whitespace();
        let (Some(rank_token), Some(tier_token)) = (tokens.next(), tokens.next()) else {
            return Self::LOWEST;
        };
        let rank = RankName::from_label(rank_token).unwrap_or(RankName::Iron);
        let tier = RankTier::from_label(tier_token).unwrap_or(RankTier::Four);
        let ordinal = rank
            .index()
            .saturating_mul(4)
            .saturating_add(tier.index());
        Self {
            rank,
            tier,
            ordinal,
        }
    }
}

impl Default for RankStanding {
    fn default() -> Self {
        Self::LOWEST
    }
}

impl core::fmt::Display for RankStanding {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {}", self.rank, self.tier)
    }
}

/// User-adjustable settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ThemeSettings {
    /// Accent color.
    pub color: ThemeColor,
    /// High-contrast background.
    pub is_high_contrast: bool,
    /// Whether transient notifications are shown.
    pub notifications_enabled: bool,
    /// Free-text personality handed to the chat assistant.
    pub assistant_personality: String,
    /// When set, XP deltas also move the competitive rank counter.
    pub is_ranked_mode: bool,
}

impl Default for ThemeSettings {
    fn default() -> Self {
        Self {
            color: ThemeColor::Violet,
            is_high_contrast: false,
            notifications_enabled: true,
            assistant_personality: String::from(DEFAULT_PERSONALITY),
            is_ranked_mode: true,
        }
    }
}

/// The single user profile driving every screen.
///
/// `xp`, `level`, `rank_xp`, the current rank fields, `highest_rank` and
/// `total_completed` are only ever changed by the progression mutation
/// handler.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct UserProfile {
    /// Display name chosen during onboarding.
    pub name: String,
    /// Cumulative experience, floored at zero.
    pub xp: u32,
    /// Derived level, `xp / 500 + 1`.
    pub level: u32,
    /// Consecutive active days.
    pub streak: u32,
    /// Number of major quests currently counted as completed.
    pub total_completed: u32,
    /// Avatar URL or data URI.
    pub profile_picture: String,
    /// Whether onboarding has been finished.
    pub onboarding_complete: bool,
    /// Competitive rank counter, only moved in ranked mode.
    pub rank_xp: u32,
    /// Major rank derived from `rank_xp`.
    pub current_rank: RankName,
    /// Sub-tier derived from `rank_xp`.
    pub current_tier: RankTier,
    /// Best standing ever reached; never regresses.
    pub highest_rank: RankStanding,
    /// User settings.
    pub settings: ThemeSettings,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            name: String::new(),
            xp: 0,
            level: 1,
            streak: 0,
            total_completed: 0,
            profile_picture: String::new(),
            onboarding_complete: false,
            rank_xp: 0,
            current_rank: RankName::Iron,
            current_tier: RankTier::Four,
            highest_rank: RankStanding::LOWEST,
            settings: ThemeSettings::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

/// One step of an AI-generated quest breakdown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SubTask {
    /// Sub-task identifier.
    pub id: SubTaskId,
    /// Short action title.
    pub title: String,
    /// Completion flag.
    pub is_completed: bool,
}

/// A quest on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Task {
    /// Quest identifier.
    pub id: TaskId,
    /// Title shown on the card.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Category.
    pub category: TaskCategory,
    /// Difficulty chosen at creation.
    pub difficulty: TaskDifficulty,
    /// Completion flag.
    pub is_completed: bool,
    /// Due date.
    pub due_date: DateTime<Utc>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Completion time, set while `is_completed` is true.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
    /// XP granted on completion.
    pub xp_value: u32,
    /// Whether the quest came from the generative model.
    pub is_ai_generated: bool,
    /// Breakdown steps (empty for manual quests).
    #[serde(default)]
    pub sub_tasks: Vec<SubTask>,
}

/// Completion count for one weekday in the rolling activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DailyProgress {
    /// Weekday abbreviation (`"Mon"` .. `"Sun"`).
    pub date: String,
    /// Major quests completed on that day.
    pub count: u32,
}

/// Weekdays of the activity log, Monday first.
pub const WEEK: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

/// Abbreviation stored in [`DailyProgress::date`].
pub const fn weekday_label(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "Mon",
        Weekday::Tue => "Tue",
        Weekday::Wed => "Wed",
        Weekday::Thu => "Thu",
        Weekday::Fri => "Fri",
        Weekday::Sat => "Sat",
        Weekday::Sun => "Sun",
    }
}

impl DailyProgress {
    /// A zeroed week in [`WEEK`] order.
    pub fn zeroed_week() -> Vec<Self> {
        WEEK.iter()
            .map(|day| Self {
                date: String::from(weekday_label(*day)),
                count: 0,
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Chat
// ---------------------------------------------------------------------------

/// An entry in the assistant chat log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct ChatMessage {
    /// Message identifier.
    pub id: MessageId,
    /// Author.
    pub role: ChatRole,
    /// Message body.
    pub text: String,
    /// Model that produced the reply (assistant messages only).
    #[serde(default)]
    pub model_used: Option<String>,
    /// Web pages the reply was grounded on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<WebSource>,
    /// When the message was recorded.
    pub created_at: DateTime<Utc>,
}

/// A web page cited by a search-grounded reply.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct WebSource {
    /// Page URL.
    pub uri: String,
    /// Page title, when the backend reported one.
    #[serde(default)]
    pub title: Option<String>,
}

impl WebSource {
    /// Title for display, falling back to the URL.
    pub fn label(&self) -> &str {
        self.title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or(&self.uri)
    }
}

// ---------------------------------------------------------------------------
// Gateway payloads
// ---------------------------------------------------------------------------

/// A quest suggested by the generative model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SuggestedTask {
    /// Short action title.
    pub title: String,
    /// One-sentence description.
    #[serde(default)]
    pub description: String,
    /// Free-form category as returned by the model.
    #[serde(default)]
    pub category: String,
}

/// A multiple-choice question of a mastery challenge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct PracticeQuestion {
    /// Question identifier assigned by the model.
    #[serde(default)]
    pub id: String,
    /// Question text.
    pub question: String,
    /// Answer options.
    pub options: Vec<String>,
    /// The correct option.
    pub correct_answer: String,
    /// Why the correct option is correct.
    #[serde(default)]
    pub explanation: String,
}

/// Post-completion quiz plus a follow-up quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "camelCase")]
pub struct MasteryChallenge {
    /// Quiz questions (ten when the model complies).
    #[serde(default)]
    pub questions: Vec<PracticeQuestion>,
    /// Advanced follow-up quest.
    pub next_quest: SuggestedTask,
}

// ---------------------------------------------------------------------------
// Store snapshot
// ---------------------------------------------------------------------------

/// Everything the local store persists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AppData {
    /// The user profile.
    pub user: UserProfile,
    /// The quest board.
    #[serde(default)]
    pub tasks: Vec<Task>,
    /// Rolling weekly activity log.
    #[serde(default)]
    pub history: Vec<DailyProgress>,
    /// Assistant chat log.
    #[serde(default)]
    pub chat_history: Vec<ChatMessage>,
}
