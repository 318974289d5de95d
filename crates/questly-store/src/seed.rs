//! Initial contents of a brand-new store.

use questly_types::{AppData, DailyProgress, UserProfile};

/// A not-yet-onboarded profile, an empty board, a zeroed week and no chat.
pub fn fresh_data() -> AppData {
    AppData {
        user: UserProfile::default(),
        tasks: Vec::new(),
        history: DailyProgress::zeroed_week(),
        chat_history: Vec::new(),
    }
}
