//! Progression calculator: rank XP to a position on the competitive ladder.
//!
//! Rank XP is bucketed into sub-tiers of [`TIER_SIZE`] points, four sub-tiers
//! to a major rank, seven major ranks in all. The bucket count is the
//! *absolute ordinal*, which is what transitions and the highest-rank record
//! compare. Past the top of the ladder the major rank saturates at Mythic
//! while the ordinal keeps counting.

use questly_types::{RankName, RankStanding, RankTier};

use crate::{NUMBER_OF_MAJOR_RANKS, TIER_SIZE, TIERS_PER_RANK};

/// Result of the progression calculator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankStatus {
    /// Major rank, saturated at Mythic.
    pub rank: RankName,
    /// Sub-tier within the major rank.
    pub tier: RankTier,
    /// `rank_xp / TIER_SIZE`, not saturated.
    pub absolute_ordinal: u32,
}

impl RankStatus {
    /// The standing to record on the profile.
    pub const fn standing(self) -> RankStanding {
        RankStanding {
            rank: self.rank,
            tier: self.tier,
            ordinal: self.absolute_ordinal,
        }
    }
}

/// Map a rank XP total to its rank, sub-tier and absolute ordinal.
pub const fn rank_status(rank_xp: u32) -> RankStatus {
    let units = rank_xp / TIER_SIZE;
    let major = units / TIERS_PER_RANK;
    let major = if major < NUMBER_OF_MAJOR_RANKS {
        major
    } else {
        NUMBER_OF_MAJOR_RANKS.saturating_sub(1)
    };
    RankStatus {
        rank: RankName::from_index(major),
        tier: RankTier::from_index(units % TIERS_PER_RANK),
        absolute_ordinal: units,
    }
}

/// Absolute ordinal of a `"<Rank> <Tier>"` label.
///
/// Malformed labels resolve to 0 instead of failing.
pub fn ordinal_from_label(label: &str) -> u32 {
    RankStanding::from_label(label).ordinal
}
