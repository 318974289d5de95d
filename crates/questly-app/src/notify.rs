//! Transient notices raised by progression events.
//!
//! Each kind of notice has a single slot: a newer XP chip replaces the
//! previous one instead of stacking. Notices expire on their own; callers
//! read them through [`NotificationBoard::active`] with the current instant.

use std::fmt;
use std::time::{Duration, Instant};

use questly_progression::ProgressEvent;
use questly_types::{RankStanding, TransitionDirection};

/// How long an XP chip stays visible.
pub const XP_NOTICE_TTL: Duration = Duration::from_secs(3);

/// How long a rank banner stays visible.
pub const RANK_NOTICE_TTL: Duration = Duration::from_secs(4);

/// How long the onboarding celebration stays visible.
pub const CELEBRATION_TTL: Duration = Duration::from_secs(4);

/// What a notice announces.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoticeKind {
    /// Rank XP moved.
    XpChange {
        /// Magnitude.
        amount: u64,
        /// Direction.
        is_gain: bool,
    },
    /// The user moved to another rank bucket.
    RankTransition {
        /// Promotion or demotion.
        direction: TransitionDirection,
        /// The new standing.
        standing: RankStanding,
    },
    /// Onboarding finished.
    Celebration,
}

/// A notice with its expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Content.
    pub kind: NoticeKind,
    /// Instant after which the notice is gone.
    pub expires_at: Instant,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            NoticeKind::XpChange { amount, is_gain } => {
                let sign = if *is_gain { '+' } else { '-' };
                write!(f, "{sign}{amount} RANK XP")
            }
            NoticeKind::RankTransition {
                direction: TransitionDirection::Up,
                standing,
            } => write!(f, "RANK UP! {standing}"),
            NoticeKind::RankTransition {
                direction: TransitionDirection::Down,
                standing,
            } => write!(f, "RANK DOWN {standing}"),
            NoticeKind::Celebration => f.write_str("YOUR QUEST BEGINS NOW"),
        }
    }
}

/// Holds at most one live notice per kind.
#[derive(Debug, Clone)]
pub struct NotificationBoard {
    enabled: bool,
    xp: Option<Notice>,
    rank: Option<Notice>,
    celebration: Option<Notice>,
}

impl Default for NotificationBoard {
    fn default() -> Self {
        Self::new(true)
    }
}

fn expiry(now: Instant, ttl: Duration) -> Instant {
    now.checked_add(ttl).unwrap_or(now)
}

impl NotificationBoard {
    /// An empty board.
    pub const fn new(enabled: bool) -> Self {
        Self {
            enabled,
            xp: None,
            rank: None,
            celebration: None,
        }
    }

    /// Follow the user's notification setting. Disabling drops live notices.
    pub const fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
        if !enabled {
            self.xp = None;
            self.rank = None;
            self.celebration = None;
        }
    }

    /// Whether notices are currently accepted.
    pub const fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Raise notices for the events of one XP application.
    ///
    /// A new best standing is not announced separately; the transition
    /// banner already shows it.
    pub fn push_events(&mut self, events: &[ProgressEvent], now: Instant) {
        if !self.enabled {
            return;
        }
        for event in events {
            match event {
                ProgressEvent::XpChanged { amount, is_gain } => {
                    self.xp = Some(Notice {
                        kind: NoticeKind::XpChange {
                            amount: *amount,
                            is_gain: *is_gain,
                        },
                        expires_at: expiry(now, XP_NOTICE_TTL),
                    });
                }
                ProgressEvent::RankTransition { direction, standing } => {
                    self.rank = Some(Notice {
                        kind: NoticeKind::RankTransition {
                            direction: *direction,
                            standing: *standing,
                        },
                        expires_at: expiry(now, RANK_NOTICE_TTL),
                    });
                }
                ProgressEvent::HighestRankAdvanced(_) => {}
            }
        }
    }

    /// Show the onboarding celebration.
    pub fn celebrate(&mut self, now: Instant) {
        if self.enabled {
            self.celebration = Some(Notice {
                kind: NoticeKind::Celebration,
                expires_at: expiry(now, CELEBRATION_TTL),
            });
        }
    }

    /// Drop expired notices and return the rest, rank banner first.
    pub fn active(&mut self, now: Instant) -> Vec<Notice> {
        for slot in [&mut self.rank, &mut self.xp, &mut self.celebration] {
            if slot.as_ref().is_some_and(|n| n.expires_at <= now) {
                *slot = None;
            }
        }
        [&self.rank, &self.xp, &self.celebration]
            .into_iter()
            .flatten()
            .cloned()
            .collect()
    }
}
