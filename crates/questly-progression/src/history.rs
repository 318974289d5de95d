//! Seven-day rolling completion log.
//!
//! Entries are keyed by weekday abbreviation, not by calendar date, so a
//! count recorded last Tuesday is bumped again this Tuesday. Only positive
//! major XP deltas increment the log; un-completing a quest does not
//! decrement it.

use chrono::Weekday;
use questly_types::{DailyProgress, weekday_label};
use serde::{Deserialize, Serialize};

/// The weekly activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeeklyHistory {
    entries: Vec<DailyProgress>,
}

impl WeeklyHistory {
    /// A zeroed week, Monday first.
    pub fn fresh() -> Self {
        Self {
            entries: DailyProgress::zeroed_week(),
        }
    }

    /// Wrap entries loaded from the store.
    pub const fn from_entries(entries: Vec<DailyProgress>) -> Self {
        Self { entries }
    }

    /// Borrow the entries in stored order.
    pub fn entries(&self) -> &[DailyProgress] {
        &self.entries
    }

    /// Hand the entries back for persistence.
    pub fn into_entries(self) -> Vec<DailyProgress> {
        self.entries
    }

    /// Record one completed major quest on `day`.
    ///
    /// An imported log missing the day gets a new entry for it.
    pub fn increment(&mut self, day: Weekday) {
        let label = weekday_label(day);
        if let Some(entry) = self.entries.iter_mut().find(|e| e.date == label) {
            entry.count = entry.count.saturating_add(1);
        } else {
            self.entries.push(DailyProgress {
                date: String::from(label),
                count: 1,
            });
        }
    }

    /// Count recorded for `day`, zero when absent.
    pub fn count_for(&self, day: Weekday) -> u32 {
        let label = weekday_label(day);
        self.entries
            .iter()
            .find(|e| e.date == label)
            .map_or(0, |e| e.count)
    }

    /// Sum of all seven days.
    pub fn total(&self) -> u32 {
        self.entries
            .iter()
            .fold(0_u32, |acc, e| acc.saturating_add(e.count))
    }
}

impl Default for WeeklyHistory {
    fn default() -> Self {
        Self::fresh()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_week_is_monday_first_and_empty() {
        let week = WeeklyHistory::fresh();
        let labels: Vec<&str> = week.entries().iter().map(|e| e.date.as_str()).collect();
        assert_eq!(labels, vec!["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"]);
        assert_eq!(week.total(), 0);
        assert_eq!(week.entries(), DailyProgress::zeroed_week().as_slice());
    }

    #[test]
    fn increment_touches_only_the_given_day() {
        let mut week = WeeklyHistory::fresh();
        week.increment(Weekday::Wed);
        week.increment(Weekday::Wed);
        week.increment(Weekday::Sun);
        assert_eq!(week.count_for(Weekday::Wed), 2);
        assert_eq!(week.count_for(Weekday::Sun), 1);
        assert_eq!(week.count_for(Weekday::Mon), 0);
        assert_eq!(week.total(), 3);
    }

    #[test]
    fn missing_day_is_created_on_increment() {
        let mut week = WeeklyHistory::from_entries(Vec::new());
        week.increment(Weekday::Fri);
        assert_eq!(week.entries().len(), 1);
        assert_eq!(week.count_for(Weekday::Fri), 1);
    }

    #[test]
    fn serializes_as_plain_list() {
        let json = serde_json::to_value(WeeklyHistory::fresh()).unwrap_or_default();
        assert!(json.is_array());
    }
}
