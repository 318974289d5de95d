//! Level derivation from cumulative XP.

use crate::LEVEL_SIZE;

/// Level for a cumulative XP total: `xp / 500 + 1`.
pub const fn level_for_xp(xp: u32) -> u32 {
    (xp / LEVEL_SIZE).saturating_add(1)
}

/// Progress through the current level as a whole percentage (0..=99).
pub const fn level_progress_pct(xp: u32) -> u32 {
    (xp % LEVEL_SIZE) / (LEVEL_SIZE / 100)
}
