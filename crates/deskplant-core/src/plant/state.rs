//! Plant health, growth, and decay arithmetic.
//!
//! [`PlantState`] is pure: it never touches storage or the clock. Callers pass
//! `now` explicitly and persist the state after each mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::kind::PlantType;

pub const MAX_HEALTH: f64 = 100.0;
pub const MIN_HEALTH: f64 = 0.0;

/// Health gained per watering before the growth multiplier.
const WATER_GAIN: f64 = 10.0;
/// Health lost per explicit wither before the wither multiplier.
const WITHER_LOSS: f64 = 15.0;
/// Hours without watering before decay starts.
const DECAY_GRACE_HOURS: f64 = 4.0;
/// Health lost per hour past the grace period before the wither multiplier.
const DECAY_PER_HOUR: f64 = 2.0;
const SESSIONS_PER_LEVEL: u32 = 5;

/// Display tier derived from health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Thriving,
    Healthy,
    NeedsCare,
    Wilting,
    Critical,
}

impl HealthStatus {
    pub fn from_health(health: f64) -> Self {
        if health >= 80.0 {
            HealthStatus::Thriving
        } else if health >= 60.0 {
            HealthStatus::Healthy
        } else if health >= 40.0 {
            HealthStatus::NeedsCare
        } else if health >= 20.0 {
            HealthStatus::Wilting
        } else {
            HealthStatus::Critical
        }
    }

    pub fn message_key(self) -> &'static str {
        match self {
            HealthStatus::Thriving => "plant.status.thriving",
            HealthStatus::Healthy => "plant.status.healthy",
            HealthStatus::NeedsCare => "plant.status.needscare",
            HealthStatus::Wilting => "plant.status.wilting",
            HealthStatus::Critical => "plant.status.critical",
        }
    }
}

/// Persistent plant record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlantState {
    #[serde(rename = "type")]
    plant_type: PlantType,
    health: f64,
    level: u32,
    total_sessions: u32,
    last_watered_at: DateTime<Utc>,
}

impl PlantState {
    /// A fresh plant at full health.
    pub fn new(plant_type: PlantType, now: DateTime<Utc>) -> Self {
        Self {
            plant_type,
            health: MAX_HEALTH,
            level: 1,
            total_sessions: 0,
            last_watered_at: now,
        }
    }

    pub fn plant_type(&self) -> PlantType {
        self.plant_type
    }

    pub fn health(&self) -> f64 {
        self.health
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn total_sessions(&self) -> u32 {
        self.total_sessions
    }

    pub fn last_watered_at(&self) -> DateTime<Utc> {
        self.last_watered_at
    }

    pub fn set_plant_type(&mut self, plant_type: PlantType) {
        self.plant_type = plant_type;
    }

    /// Reward for one completed focus session.
    pub fn water(&mut self, now: DateTime<Utc>) {
        self.health = (self.health + WATER_GAIN * self.plant_type.growth_rate()).min(MAX_HEALTH);
        self.total_sessions = self.total_sessions.saturating_add(1);
        self.last_watered_at = now;
        self.level = level_for(self.total_sessions);
    }

    pub fn wither(&mut self) {
        self.health = (self.health - WITHER_LOSS * self.plant_type.wither_rate()).max(MIN_HEALTH);
    }

    /// Apply neglect decay and return the amount of health removed.
    ///
    /// The decay amount depends on the time since the last watering, not since
    /// the last check, so this must run on a schedule rather than ad hoc.
    pub fn check_health(&mut self, now: DateTime<Utc>) -> f64 {
        let hours = self.hours_since_watered(now);
        if hours <= DECAY_GRACE_HOURS {
            return 0.0;
        }
        let amount = (hours - DECAY_GRACE_HOURS) * DECAY_PER_HOUR * self.plant_type.wither_rate();
        let before = self.health;
        self.health = (self.health - amount).max(MIN_HEALTH);
        before - self.health
    }

    pub fn hours_since_watered(&self, now: DateTime<Utc>) -> f64 {
        (now - self.last_watered_at).num_milliseconds() as f64 / 3_600_000.0
    }

    pub fn health_status(&self) -> HealthStatus {
        HealthStatus::from_health(self.health)
    }

    /// Display scale in `[0.5, 2.0]`.
    pub fn size(&self) -> f64 {
        let health_factor = self.health / MAX_HEALTH;
        let level_factor = (self.level as f64 / 10.0).min(1.0);
        0.5 + health_factor * level_factor * 1.5
    }

    pub fn emoji(&self) -> &'static str {
        if self.health < 20.0 {
            self.plant_type.critical_emoji()
        } else if self.health < 40.0 {
            self.plant_type.wilting_emoji()
        } else {
            self.plant_type.emoji()
        }
    }

    /// Re-establish invariants on a record read from storage.
    pub(crate) fn normalized(mut self) -> Self {
        self.health = if self.health.is_finite() {
            self.health.clamp(MIN_HEALTH, MAX_HEALTH)
        } else {
            MIN_HEALTH
        };
        self.level = level_for(self.total_sessions);
        self
    }
}

fn level_for(total_sessions: u32) -> u32 {
    1 + total_sessions / SESSIONS_PER_LEVEL
}
