//! Summary statistics for the progress screen.

use questly_types::Task;

/// Share of quests completed, as a rounded whole percentage.
pub fn completion_percent(tasks: &[Task]) -> u32 {
    let total = u64::try_from(tasks.len()).unwrap_or(u64::MAX);
    let done = u64::try_from(tasks.iter().filter(|t| t.is_completed).count()).unwrap_or(0);
    // Round half up: (done * 100 + total / 2) / total.
    let scaled = done
        .saturating_mul(100)
        .saturating_add(total / 2)
        .checked_div(total)
        .unwrap_or(0);
    u32::try_from(scaled).unwrap_or(100)
}

/// Mean time from creation to completion over completed quests, formatted
/// as `"{h}h {m}m"` or `"{m}m"`.
///
/// Quests without a completion timestamp are ignored; with none left the
/// result is `"0m"`.
pub fn average_completion_time(tasks: &[Task]) -> String {
    let durations: Vec<i64> = tasks
        .iter()
        .filter(|t| t.is_completed)
        .filter_map(|t| {
            t.completed_at
                .map(|done| done.signed_duration_since(t.created_at).num_milliseconds())
        })
        .collect();
    let count = i64::try_from(durations.len()).unwrap_or(i64::MAX);
    let total_ms = durations
        .iter()
        .fold(0_i64, |acc, ms| acc.saturating_add(*ms));
    let avg_ms = total_ms.checked_div(count).unwrap_or(0).max(0);

    let mins = avg_ms / 60_000;
    let hours = mins / 60;
    if hours > 0 {
        format!("{hours}h {}m", mins % 60)
    } else {
        format!("{mins}m")
    }
}
