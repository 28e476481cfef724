//! Statistics module for DeskPlant
//!
//! Daily focus totals, the weekly view, and the day streak.

mod daily;

pub use daily::{DailyStat, StatsAggregator, StatsSummary};
