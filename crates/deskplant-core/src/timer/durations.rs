use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const WORK_MIN: (u64, u64) = (15, 60);
const SHORT_BREAK_MIN: (u64, u64) = (3, 15);
const LONG_BREAK_MIN: (u64, u64) = (10, 30);

/// Phase lengths in seconds plus the long-break cadence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerDurations {
    pub work_secs: u64,
    pub short_break_secs: u64,
    pub long_break_secs: u64,
    /// Every Nth completed work session earns a long break.
    pub sessions_before_long_break: u32,
}

impl Default for TimerDurations {
    fn default() -> Self {
        Self {
            work_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            sessions_before_long_break: 4,
        }
    }
}

impl TimerDurations {
    /// Minutes too large to represent saturate, so `validate` rejects them.
    pub fn from_minutes(work: u64, short_break: u64, long_break: u64) -> Self {
        Self {
            work_secs: work.saturating_mul(60),
            short_break_secs: short_break.saturating_mul(60),
            long_break_secs: long_break.saturating_mul(60),
            ..Self::default()
        }
    }

    /// Check each duration against its allowed range.
    pub fn validate(&self) -> Result<(), ValidationError> {
        check("work duration", self.work_secs, WORK_MIN)?;
        check("short break", self.short_break_secs, SHORT_BREAK_MIN)?;
        check("long break", self.long_break_secs, LONG_BREAK_MIN)?;
        if self.sessions_before_long_break == 0 {
            return Err(ValidationError::InvalidValue {
                field: "sessions_before_long_break".into(),
                message: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    pub fn work_minutes(&self) -> u32 {
        (self.work_secs / 60) as u32
    }
}

fn check(field: &'static str, secs: u64, (min, max): (u64, u64)) -> Result<(), ValidationError> {
    if secs < min * 60 || secs > max * 60 {
        return Err(ValidationError::DurationOutOfRange {
            field,
            min_minutes: min,
            max_minutes: max,
            actual_secs: secs,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(TimerDurations::default().validate().is_ok());
    }

    #[test]
    fn bounds_are_inclusive() {
        assert!(TimerDurations::from_minutes(15, 3, 10).validate().is_ok());
        assert!(TimerDurations::from_minutes(60, 15, 30).validate().is_ok());
    }

    #[test]
    fn out_of_range_is_rejected() {
        let err = TimerDurations::from_minutes(61, 5, 15).validate().unwrap_err();
        assert!(matches!(
            err,
            ValidationError::DurationOutOfRange { field: "work duration", .. }
        ));
        assert!(TimerDurations::from_minutes(25, 2, 15).validate().is_err());
        assert!(TimerDurations::from_minutes(25, 5, 31).validate().is_err());
    }

    #[test]
    fn huge_minutes_saturate_and_fail_validation() {
        let d = TimerDurations::from_minutes(u64::MAX / 2, 5, 15);
        assert_eq!(d.work_secs, u64::MAX);
        assert!(matches!(
            d.validate(),
            Err(ValidationError::DurationOutOfRange { field: "work duration", .. })
        ));
    }

    #[test]
    fn zero_cadence_is_rejected() {
        let d = TimerDurations {
            sessions_before_long_break: 0,
            ..TimerDurations::default()
        };
        assert!(d.validate().is_err());
    }
}
