use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::plant::{HealthStatus, PlantType};
use crate::timer::{BreakKind, Phase, TimerState};

/// Every state change in the system produces an Event.
/// The coordinator consumes timer events; the presentation layer subscribes to all of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    WorkStarted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    BreakStarted {
        kind: BreakKind,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerResumed {
        phase: Phase,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerStopped {
        at: DateTime<Utc>,
    },
    /// A work phase ended. Skipped sessions are not rewarded.
    WorkCompleted {
        skipped: bool,
        duration_secs: u64,
        sessions_completed: u32,
        at: DateTime<Utc>,
    },
    BreakCompleted {
        kind: BreakKind,
        skipped: bool,
        at: DateTime<Utc>,
    },
    StateSnapshot {
        state: TimerState,
        remaining_secs: u64,
        total_secs: u64,
        formatted_time: String,
        progress: f64,
        sessions_completed: u32,
        at: DateTime<Utc>,
    },
    PlantWatered {
        health: f64,
        level: u32,
        total_sessions: u32,
        at: DateTime<Utc>,
    },
    PlantDecayed {
        amount: f64,
        health: f64,
        status: HealthStatus,
        at: DateTime<Utc>,
    },
    PlantTypeChanged {
        plant_type: PlantType,
        at: DateTime<Utc>,
    },
    LicenseChanged {
        licensed: bool,
        error: Option<String>,
        at: DateTime<Utc>,
    },
    /// A command was refused, e.g. a locked plant type.
    CommandRejected {
        command: String,
        reason: String,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::WorkStarted { at, .. }
            | Event::BreakStarted { at, .. }
            | Event::TimerPaused { at, .. }
            | Event::TimerResumed { at, .. }
            | Event::TimerStopped { at }
            | Event::WorkCompleted { at, .. }
            | Event::BreakCompleted { at, .. }
            | Event::StateSnapshot { at, .. }
            | Event::PlantWatered { at, .. }
            | Event::PlantDecayed { at, .. }
            | Event::PlantTypeChanged { at, .. }
            | Event::LicenseChanged { at, .. }
            | Event::CommandRejected { at, .. } => *at,
        }
    }
}
