//! Per-day focus totals derived from completed work sessions.
//!
//! Days are local calendar dates. Entries are created lazily on the first
//! session of a day and only ever incremented.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStat {
    pub date: NaiveDate,
    pub sessions_completed: u32,
    pub total_minutes: u32,
}

impl DailyStat {
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date == day
    }
}

/// Summary across all recorded days.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total_sessions: u64,
    pub total_focus_minutes: u64,
    pub days_tracked: usize,
    pub streak: u32,
}

/// Folds completed sessions into one entry per day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StatsAggregator {
    entries: Vec<DailyStat>,
}

impl StatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Vec<DailyStat>) -> Self {
        let mut stats = Self::new();
        // Collapse duplicate days a hand-edited or merged record might carry.
        for entry in entries {
            stats.add(entry.date, entry.sessions_completed, entry.total_minutes);
        }
        stats
    }

    pub fn entries(&self) -> &[DailyStat] {
        &self.entries
    }

    pub fn into_entries(self) -> Vec<DailyStat> {
        self.entries
    }

    /// Count one completed session of `minutes` on `date`.
    pub fn record(&mut self, date: NaiveDate, minutes: u32) {
        self.add(date, 1, minutes);
    }

    fn add(&mut self, date: NaiveDate, sessions: u32, minutes: u32) {
        match self.entries.iter_mut().find(|e| e.is_on(date)) {
            Some(entry) => {
                entry.sessions_completed = entry.sessions_completed.saturating_add(sessions);
                entry.total_minutes = entry.total_minutes.saturating_add(minutes);
            }
            None => self.entries.push(DailyStat {
                date,
                sessions_completed: sessions,
                total_minutes: minutes,
            }),
        }
    }

    pub fn today_stats(&self, today: NaiveDate) -> Option<&DailyStat> {
        self.entries.iter().find(|e| e.is_on(today))
    }

    /// Entries dated on or after `today - 7 days`, newest first.
    pub fn week_stats(&self, today: NaiveDate) -> Vec<DailyStat> {
        let cutoff = today - Duration::days(7);
        let mut week: Vec<DailyStat> = self
            .entries
            .iter()
            .filter(|e| e.date >= cutoff)
            .cloned()
            .collect();
        week.sort_by(|a, b| b.date.cmp(&a.date));
        week
    }

    /// Consecutive days with an entry, walking back from `today`.
    pub fn streak(&self, today: NaiveDate) -> u32 {
        let mut streak = 0;
        let mut day = today;
        while self.today_stats(day).is_some() {
            streak += 1;
            match day.pred_opt() {
                Some(prev) => day = prev,
                None => break,
            }
        }
        streak
    }

    pub fn total_focus_minutes(&self) -> u64 {
        self.entries.iter().map(|e| e.total_minutes as u64).sum()
    }

    pub fn total_sessions(&self) -> u64 {
        self.entries.iter().map(|e| e.sessions_completed as u64).sum()
    }

    pub fn summary(&self, today: NaiveDate) -> StatsSummary {
        StatsSummary {
            total_sessions: self.total_sessions(),
            total_focus_minutes: self.total_focus_minutes(),
            days_tracked: self.entries.len(),
            streak: self.streak(today),
        }
    }

    /// Drop entries dated before `cutoff`. Returns how many were removed.
    pub fn prune_before(&mut self, cutoff: NaiveDate) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.date >= cutoff);
        before - self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn same_day_accumulates() {
        let mut stats = StatsAggregator::new();
        stats.record(day(10), 25);
        stats.record(day(10), 25);
        assert_eq!(stats.entries().len(), 1);
        assert_eq!(
            stats.today_stats(day(10)),
            Some(&DailyStat {
                date: day(10),
                sessions_completed: 2,
                total_minutes: 50
            })
        );
    }

    #[test]
    fn today_stats_is_none_without_entry() {
        let mut stats = StatsAggregator::new();
        stats.record(day(9), 25);
        assert!(stats.today_stats(day(10)).is_none());
    }

    #[test]
    fn week_stats_filters_and_sorts_descending() {
        let mut stats = StatsAggregator::new();
        for d in [2, 3, 8, 5, 10] {
            stats.record(day(d), 25);
        }
        let dates: Vec<_> = stats.week_stats(day(10)).iter().map(|e| e.date).collect();
        assert_eq!(dates, vec![day(10), day(8), day(5), day(3)]);
    }

    #[test]
    fn streak_requires_today() {
        let mut stats = StatsAggregator::new();
        stats.record(day(8), 25);
        stats.record(day(9), 25);
        assert_eq!(stats.streak(day(10)), 0);
    }

    #[test]
    fn streak_stops_at_first_gap() {
        let mut stats = StatsAggregator::new();
        for d in [4, 5, 7, 8, 9, 10] {
            stats.record(day(d), 25);
        }
        assert_eq!(stats.streak(day(10)), 4);
    }

    #[test]
    fn from_entries_merges_duplicates() {
        let stats = StatsAggregator::from_entries(vec![
            DailyStat { date: day(1), sessions_completed: 1, total_minutes: 25 },
            DailyStat { date: day(1), sessions_completed: 2, total_minutes: 50 },
        ]);
        assert_eq!(stats.entries().len(), 1);
        assert_eq!(stats.total_sessions(), 3);
        assert_eq!(stats.total_focus_minutes(), 75);
    }

    #[test]
    fn prune_removes_old_days() {
        let mut stats = StatsAggregator::new();
        for d in [1, 2, 3] {
            stats.record(day(d), 25);
        }
        assert_eq!(stats.prune_before(day(2)), 1);
        assert_eq!(stats.entries().len(), 2);
    }

    #[test]
    fn serializes_as_plain_list() {
        let mut stats = StatsAggregator::new();
        stats.record(day(1), 30);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"[{"date":"2025-03-01","sessionsCompleted":1,"totalMinutes":30}]"#
        );
    }
}
