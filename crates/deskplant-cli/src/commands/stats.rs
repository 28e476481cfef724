use clap::Subcommand;
use serde_json::json;

use super::{open_coordinator, print_json, CmdResult};

#[derive(Subcommand)]
pub enum StatsAction {
    /// Today's sessions and focus minutes
    Today,
    /// The last seven days, newest first
    Week,
    /// Consecutive days with at least one session
    Streak,
    /// All-time totals
    Summary,
}

pub fn run(action: StatsAction) -> CmdResult {
    let coordinator = open_coordinator()?;
    let stats = coordinator.stats();
    let today = coordinator.clock().today();

    match action {
        StatsAction::Today => match stats.today_stats(today) {
            Some(stat) => print_json(stat)?,
            None => print_json(&json!({
                "date": today,
                "sessionsCompleted": 0,
                "totalMinutes": 0,
            }))?,
        },
        StatsAction::Week => print_json(&stats.week_stats(today))?,
        StatsAction::Streak => print_json(&json!({ "streak": stats.streak(today) }))?,
        StatsAction::Summary => print_json(&stats.summary(today))?,
    }
    Ok(())
}
