//! Shared type definitions for the Questly quest tracker.
//!
//! This crate is the single source of truth for the data model shared by the
//! progression logic, the AI gateway, the local store and the application
//! session. Types flow to `TypeScript` via `ts-rs` for the client.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for tasks, sub-tasks and messages
//! - [`enums`] -- Rank ladder, quest categories and difficulties, settings
//! - [`structs`] -- Profile, quests, activity log, chat, gateway payloads

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{
    ChatRole, RankName, RankTier, TaskCategory, TaskDifficulty, ThemeColor, TransitionDirection,
};
pub use ids::{MessageId, SubTaskId, TaskId};
pub use structs::{
    AppData, ChatMessage, DEFAULT_PERSONALITY, DailyProgress, MasteryChallenge, PERSONALITY_PRESETS,
    PracticeQuestion, RankStanding, SubTask, SuggestedTask, Task, ThemeSettings, UserProfile, WEEK,
    WebSource, weekday_label,
};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation.

    #[test]
    fn export_bindings() {
        // ts-rs writes the bindings relative to the crate root when
        // `export_all` runs for types marked `#[ts(export)]`.
        use ts_rs::TS;

        // IDs
        let _ = crate::ids::TaskId::export_all();
        let _ = crate::ids::SubTaskId::export_all();
        let _ = crate::ids::MessageId::export_all();

        // Enums
        let _ = crate::enums::RankName::export_all();
        let _ = crate::enums::RankTier::export_all();
        let _ = crate::enums::TransitionDirection::export_all();
        let _ = crate::enums::TaskCategory::export_all();
        let _ = crate::enums::TaskDifficulty::export_all();
        let _ = crate::enums::ThemeColor::export_all();
        let _ = crate::enums::ChatRole::export_all();

        // Structs
        let _ = crate::structs::RankStanding::export_all();
        let _ = crate::structs::ThemeSettings::export_all();
        let _ = crate::structs::UserProfile::export_all();
        let _ = crate::structs::SubTask::export_all();
        let _ = crate::structs::Task::export_all();
        let _ = crate::structs::DailyProgress::export_all();
        let _ = crate::structs::ChatMessage::export_all();
        let _ = crate::structs::WebSource::export_all();
        let _ = crate::structs::SuggestedTask::export_all();
        let _ = crate::structs::PracticeQuestion::export_all();
        let _ = crate::structs::MasteryChallenge::export_all();
        let _ = crate::structs::AppData::export_all();
    }
}
