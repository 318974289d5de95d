//! The XP mutation handler.
//!
//! [`apply_xp`] is the only place that writes `xp`, `level`, `rank_xp`, the
//! current rank fields, `highest_rank` and `total_completed`. It returns the
//! new state together with the events the caller should surface.
//!
//! # Order of operations
//!
//! 1. Clamp XP at zero and derive the level
//! 2. In ranked mode: move rank XP, recompute the standing, emit events
//! 3. Advance the highest-rank record if the new ordinal beats it
//! 4. Adjust the completed-quest counter for major deltas
//! 5. Log today's completion and request a nudge for major gains

use chrono::Weekday;
use questly_types::{RankStanding, TransitionDirection, UserProfile};
use tracing::debug;

use crate::history::WeeklyHistory;
use crate::level::level_for_xp;
use crate::rank::rank_status;

/// Whether a delta represents a whole quest or a partial step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XpKind {
    /// Completing or un-completing a quest. Moves the completed counter and
    /// the weekly log.
    Major,
    /// Sub-task toggles and mastery bonuses.
    Minor,
}

/// A signed XP change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct XpDelta {
    /// Signed amount.
    pub amount: i64,
    /// Major or minor.
    pub kind: XpKind,
}

impl XpDelta {
    /// A quest completion (positive) or un-completion (negative).
    pub const fn major(amount: i64) -> Self {
        Self {
            amount,
            kind: XpKind::Major,
        }
    }

    /// A partial-progress change.
    pub const fn minor(amount: i64) -> Self {
        Self {
            amount,
            kind: XpKind::Minor,
        }
    }

    const fn is_gain(self) -> bool {
        self.amount > 0
    }
}

/// The state the mutation handler owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// The profile.
    pub user: UserProfile,
    /// The weekly activity log.
    pub history: WeeklyHistory,
}

/// Something the caller should show the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Rank XP moved (ranked mode only).
    XpChanged {
        /// Magnitude of the change.
        amount: u64,
        /// True for a strictly positive delta.
        is_gain: bool,
    },
    /// The absolute ordinal changed.
    RankTransition {
        /// Promotion or demotion.
        direction: TransitionDirection,
        /// Standing after the change.
        standing: RankStanding,
    },
    /// A new best standing was recorded.
    HighestRankAdvanced(RankStanding),
}

/// Output of [`apply_xp`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XpOutcome {
    /// Updated state.
    pub progress: Progress,
    /// Events in the order they occurred.
    pub events: Vec<ProgressEvent>,
    /// True after a major gain: the caller should fetch a fresh nudge.
    pub nudge_requested: bool,
}

/// Add `delta` to a counter, clamping the result to `0..=u32::MAX`.
fn clamp_add(current: u32, delta: i64) -> u32 {
    let sum = i64::from(current).saturating_add(delta);
    u32::try_from(sum.max(0)).unwrap_or(u32::MAX)
}

/// Apply an XP change and derive everything that follows from it.
pub fn apply_xp(progress: Progress, delta: XpDelta, today: Weekday) -> XpOutcome {
    let Progress { mut user, mut history } = progress;
    let mut events = Vec::new();

    // 1. Cumulative XP never goes negative.
    user.xp = clamp_add(user.xp, delta.amount);
    user.level = level_for_xp(user.xp);

    // 2-3. Rank XP only moves in ranked mode.
    if user.settings.is_ranked_mode {
        let old = rank_status(user.rank_xp);
        user.rank_xp = clamp_add(user.rank_xp, delta.amount);
        let new = rank_status(user.rank_xp);

        events.push(ProgressEvent::XpChanged {
            amount: delta.amount.unsigned_abs(),
            is_gain: delta.is_gain(),
        });

        if new.absolute_ordinal != old.absolute_ordinal {
            let direction = if new.absolute_ordinal > old.absolute_ordinal {
                TransitionDirection::Up
            } else {
                TransitionDirection::Down
            };
            debug!(
                from = old.absolute_ordinal,
                to = new.absolute_ordinal,
                ?direction,
                "rank transition"
            );
            events.push(ProgressEvent::RankTransition {
                direction,
                standing: new.standing(),
            });
        }

        user.current_rank = new.rank;
        user.current_tier = new.tier;

        if new.absolute_ordinal > user.highest_rank.ordinal {
            user.highest_rank = new.standing();
            events.push(ProgressEvent::HighestRankAdvanced(user.highest_rank));
        }
    }

    // 4. A zero major delta leaves the counter alone.
    if delta.kind == XpKind::Major {
        if delta.amount > 0 {
            user.total_completed = user.total_completed.saturating_add(1);
        } else if delta.amount < 0 {
            user.total_completed = user.total_completed.saturating_sub(1);
        }
    }

    // 5.
    let nudge_requested = delta.kind == XpKind::Major && delta.is_gain();
    if nudge_requested {
        history.increment(today);
    }

    XpOutcome {
        progress: Progress { user, history },
        events,
        nudge_requested,
    }
}
