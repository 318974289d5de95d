//! Enumeration types for the Questly quest tracker.
//!
//! The rank ladder enums carry their canonical ordering in an `ALL` array;
//! the progression crate derives ordinals from the position in that array,
//! so the declaration order here is load-bearing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Rank ladder
// ---------------------------------------------------------------------------

/// One of the seven major competitive ranks, lowest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RankName {
    /// Entry rank (ordinal 0).
    Iron,
    /// Ordinal 1.
    Bronze,
    /// Ordinal 2.
    Silver,
    /// Ordinal 3.
    Gold,
    /// Ordinal 4.
    Platinum,
    /// Ordinal 5.
    Diamond,
    /// Top of the ladder (ordinal 6). Extra rank XP saturates here.
    Mythic,
}

impl RankName {
    /// Every major rank in ladder order.
    pub const ALL: [Self; 7] = [
        Self::Iron,
        Self::Bronze,
        Self::Silver,
        Self::Gold,
        Self::Platinum,
        Self::Diamond,
        Self::Mythic,
    ];

    /// Display name used in rank labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Iron => "Iron",
            Self::Bronze => "Bronze",
            Self::Silver => "Silver",
            Self::Gold => "Gold",
            Self::Platinum => "Platinum",
            Self::Diamond => "Diamond",
            Self::Mythic => "Mythic",
        }
    }

    /// Position on the ladder, `0` for Iron through `6` for Mythic.
    pub const fn index(self) -> u32 {
        match self {
            Self::Iron => 0,
            Self::Bronze => 1,
            Self::Silver => 2,
            Self::Gold => 3,
            Self::Platinum => 4,
            Self::Diamond => 5,
            Self::Mythic => 6,
        }
    }

    /// Rank at the given ladder position, saturating at Mythic.
    pub const fn from_index(index: u32) -> Self {
        match index {
            0 => Self::Iron,
            1 => Self::Bronze,
            2 => Self::Silver,
            3 => Self::Gold,
            4 => Self::Platinum,
            5 => Self::Diamond,
            _ => Self::Mythic,
        }
    }

    /// Parse a display name such as `"Gold"`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|rank| rank.as_str() == label)
    }
}

impl core::fmt::Display for RankName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sub-division of a major rank.
///
/// Ordinal 0 is the *lowest* sub-tier, so the labelled number decreases as
/// the ordinal increases: `IV < III < II < I`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum RankTier {
    /// Lowest sub-tier (ordinal 0).
    #[serde(rename = "IV")]
    Four,
    /// Ordinal 1.
    #[serde(rename = "III")]
    Three,
    /// Ordinal 2.
    #[serde(rename = "II")]
    Two,
    /// Highest sub-tier (ordinal 3).
    #[serde(rename = "I")]
    One,
}

impl RankTier {
    /// Every sub-tier, lowest first.
    pub const ALL: [Self; 4] = [Self::Four, Self::Three, Self::Two, Self::One];

    /// Roman numeral used in rank labels.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Four => "IV",
            Self::Three => "III",
            Self::Two => "II",
            Self::One => "I",
        }
    }

    /// Ordinal within a major rank, `0` for IV through `3` for I.
    pub const fn index(self) -> u32 {
        match self {
            Self::Four => 0,
            Self::Three => 1,
            Self::Two => 2,
            Self::One => 3,
        }
    }

    /// Sub-tier for an ordinal, taken modulo the four sub-tiers.
    pub const fn from_index(index: u32) -> Self {
        match index % 4 {
            0 => Self::Four,
            1 => Self::Three,
            2 => Self::Two,
            _ => Self::One,
        }
    }

    /// Parse a Roman numeral such as `"III"`.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.as_str() == label)
    }
}

impl core::fmt::Display for RankTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a rank transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum TransitionDirection {
    /// Promotion to a higher absolute rank.
    Up,
    /// Demotion to a lower absolute rank.
    Down,
}

// ---------------------------------------------------------------------------
// Quests
// ---------------------------------------------------------------------------

/// Category a quest belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskCategory {
    /// Coursework, reading, revision.
    #[default]
    Study,
    /// Exercise, sleep, nutrition.
    Health,
    /// Programming work.
    Coding,
    /// Art, writing, music.
    Creative,
    /// Anything else.
    Other,
}

impl TaskCategory {
    /// Every category in display order.
    pub const ALL: [Self; 5] = [
        Self::Study,
        Self::Health,
        Self::Coding,
        Self::Creative,
        Self::Other,
    ];

    /// Display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Study => "Study",
            Self::Health => "Health",
            Self::Coding => "Coding",
            Self::Creative => "Creative",
            Self::Other => "Other",
        }
    }

    /// Case-insensitive lookup of a category name, as returned by the
    /// generative model.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL
            .into_iter()
            .find(|category| category.as_str().eq_ignore_ascii_case(label))
    }
}

impl core::fmt::Display for TaskCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Difficulty chosen when a quest is created; determines its base XP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum TaskDifficulty {
    /// Quick win.
    #[default]
    Easy,
    /// Solid session of work.
    Hard,
    /// Multi-session effort.
    #[serde(rename = "Extremely Hard")]
    ExtremelyHard,
}

impl TaskDifficulty {
    /// Every difficulty, easiest first.
    pub const ALL: [Self; 3] = [Self::Easy, Self::Hard, Self::ExtremelyHard];

    /// Display name.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Easy => "Easy",
            Self::Hard => "Hard",
            Self::ExtremelyHard => "Extremely Hard",
        }
    }

    /// Case-insensitive lookup that ignores spaces, dashes and underscores,
    /// so `extremely-hard` matches "Extremely Hard".
    pub fn from_label(label: &str) -> Option<Self> {
        let wanted: String = label
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect();
        Self::ALL.into_iter().find(|difficulty| {
            let name: String = difficulty.as_str().chars().filter(|c| *c != ' ').collect();
            name.eq_ignore_ascii_case(&wanted)
        })
    }
}

impl core::fmt::Display for TaskDifficulty {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Settings and chat
// ---------------------------------------------------------------------------

/// Accent color of the client theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum ThemeColor {
    /// "Royal".
    #[default]
    Violet,
    /// "Forest".
    Emerald,
    /// "Ocean".
    Blue,
    /// "Crimson".
    Rose,
    /// "Gold".
    Amber,
}

impl ThemeColor {
    /// Every theme color in picker order.
    pub const ALL: [Self; 5] = [
        Self::Violet,
        Self::Emerald,
        Self::Blue,
        Self::Rose,
        Self::Amber,
    ];

    /// Hex value of the accent color.
    pub const fn hex(self) -> &'static str {
        match self {
            Self::Violet => "#8b5cf6",
            Self::Emerald => "#10b981",
            Self::Blue => "#3b82f6",
            Self::Rose => "#f43f5e",
            Self::Amber => "#f59e0b",
        }
    }

    /// Name shown in the color picker.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Violet => "Royal",
            Self::Emerald => "Forest",
            Self::Blue => "Ocean",
            Self::Rose => "Crimson",
            Self::Amber => "Gold",
        }
    }

    /// Lowercase wire name, as accepted by settings commands.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Violet => "violet",
            Self::Emerald => "emerald",
            Self::Blue => "blue",
            Self::Rose => "rose",
            Self::Amber => "amber",
        }
    }

    /// Case-insensitive lookup by wire name or picker label.
    pub fn from_label(label: &str) -> Option<Self> {
        let label = label.trim();
        Self::ALL.into_iter().find(|color| {
            color.as_str().eq_ignore_ascii_case(label) || color.label().eq_ignore_ascii_case(label)
        })
    }
}

/// Author of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    /// The person using the app.
    User,
    /// The assistant.
    Model,
}

impl ChatRole {
    /// Wire name of the role.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Model => "model",
        }
    }
}
