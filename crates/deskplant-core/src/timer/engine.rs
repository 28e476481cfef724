//! Focus/break timer state machine.
//!
//! The engine has no internal thread. The caller drives it with one `tick()`
//! per second while [`TimerEngine::is_running`] is true; ticks in any other
//! state are ignored, so a stopped timer can never be advanced by a late tick.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Working -> Idle          (tick to zero or skip)
//! Idle -> Break   -> Idle          (tick to zero or skip)
//! Working | Break -> Paused -> Working | Break   (phase remembered)
//! any -> Idle                      (stop)
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::durations::TimerDurations;
use crate::error::ValidationError;
use crate::events::Event;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Working,
    Break,
    Paused,
}

/// The active phase a paused timer returns to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Work,
    Break,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BreakKind {
    Short,
    Long,
}

/// Core timer engine.
#[derive(Debug, Clone)]
pub struct TimerEngine {
    durations: TimerDurations,
    state: TimerState,
    remaining_secs: u64,
    /// Length of the phase in progress, fixed when the phase starts.
    phase_total_secs: u64,
    /// Phase to resume into while paused.
    paused_phase: Option<Phase>,
    /// Break length chosen when the current break started.
    break_kind: BreakKind,
    sessions_completed: u32,
}

impl TimerEngine {
    pub fn new(durations: TimerDurations) -> Self {
        Self {
            durations,
            state: TimerState::Idle,
            remaining_secs: 0,
            phase_total_secs: 0,
            paused_phase: None,
            break_kind: BreakKind::Short,
            sessions_completed: 0,
        }
    }

    /// Seed the completed-session counter from storage.
    pub fn with_sessions_completed(mut self, sessions_completed: u32) -> Self {
        self.sessions_completed = sessions_completed;
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    pub fn phase_total_secs(&self) -> u64 {
        self.phase_total_secs
    }

    pub fn sessions_completed(&self) -> u32 {
        self.sessions_completed
    }

    pub fn durations(&self) -> &TimerDurations {
        &self.durations
    }

    pub fn paused_phase(&self) -> Option<Phase> {
        self.paused_phase
    }

    /// Whether the one-second driver should be ticking.
    pub fn is_running(&self) -> bool {
        matches!(self.state, TimerState::Working | TimerState::Break)
    }

    /// Break length the next `start_break` would pick.
    pub fn next_break_kind(&self) -> BreakKind {
        let every = self.durations.sessions_before_long_break.max(1);
        if self.sessions_completed > 0 && self.sessions_completed % every == 0 {
            BreakKind::Long
        } else {
            BreakKind::Short
        }
    }

    /// `MM:SS`, minutes not wrapped into hours.
    pub fn formatted_time(&self) -> String {
        format!("{:02}:{:02}", self.remaining_secs / 60, self.remaining_secs % 60)
    }

    /// 0.0 .. 1.0 progress within the current phase.
    pub fn progress(&self) -> f64 {
        if self.phase_total_secs == 0 {
            return 0.0;
        }
        let elapsed = self.phase_total_secs.saturating_sub(self.remaining_secs);
        (elapsed as f64 / self.phase_total_secs as f64).clamp(0.0, 1.0)
    }

    pub fn snapshot(&self) -> Event {
        Event::StateSnapshot {
            state: self.state,
            remaining_secs: self.remaining_secs,
            total_secs: self.phase_total_secs,
            formatted_time: self.formatted_time(),
            progress: self.progress(),
            sessions_completed: self.sessions_completed,
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    pub fn start_work(&mut self) -> Option<Event> {
        if self.state != TimerState::Idle {
            return None;
        }
        self.state = TimerState::Working;
        self.remaining_secs = self.durations.work_secs;
        self.phase_total_secs = self.durations.work_secs;
        Some(Event::WorkStarted {
            duration_secs: self.phase_total_secs,
            at: Utc::now(),
        })
    }

    /// Start a break. The long/short choice is made here and not revisited.
    pub fn start_break(&mut self) -> Option<Event> {
        if self.state != TimerState::Idle {
            return None;
        }
        let kind = self.next_break_kind();
        let secs = match kind {
            BreakKind::Long => self.durations.long_break_secs,
            BreakKind::Short => self.durations.short_break_secs,
        };
        self.state = TimerState::Break;
        self.break_kind = kind;
        self.remaining_secs = secs;
        self.phase_total_secs = secs;
        Some(Event::BreakStarted {
            kind,
            duration_secs: secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        let phase = match self.state {
            TimerState::Working => Phase::Work,
            TimerState::Break => Phase::Break,
            _ => return None,
        };
        self.state = TimerState::Paused;
        self.paused_phase = Some(phase);
        Some(Event::TimerPaused {
            phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn resume(&mut self) -> Option<Event> {
        if self.state != TimerState::Paused {
            return None;
        }
        let phase = self.paused_phase.take()?;
        if self.remaining_secs == 0 {
            self.go_idle();
            return Some(Event::TimerStopped { at: Utc::now() });
        }
        self.state = match phase {
            Phase::Work => TimerState::Working,
            Phase::Break => TimerState::Break,
        };
        Some(Event::TimerResumed {
            phase,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn stop(&mut self) -> Option<Event> {
        if self.state == TimerState::Idle {
            return None;
        }
        self.go_idle();
        Some(Event::TimerStopped { at: Utc::now() })
    }

    /// End the running phase early. Skipped work does not count as completed.
    pub fn skip(&mut self) -> Option<Event> {
        match self.state {
            TimerState::Working => Some(self.complete_work(true)),
            TimerState::Break => Some(self.complete_break(true)),
            _ => None,
        }
    }

    /// Advance one second. Returns the completion event when the phase ends.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs > 0 {
            return None;
        }
        match self.state {
            TimerState::Working => Some(self.complete_work(false)),
            TimerState::Break => Some(self.complete_break(false)),
            _ => None,
        }
    }

    /// Replace the durations. Takes effect when the next phase starts.
    pub fn set_durations(&mut self, durations: TimerDurations) -> Result<(), ValidationError> {
        durations.validate()?;
        self.durations = durations;
        Ok(())
    }

    pub fn reset_sessions(&mut self) {
        self.sessions_completed = 0;
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn complete_work(&mut self, skipped: bool) -> Event {
        let duration_secs = self.phase_total_secs;
        if !skipped {
            self.sessions_completed = self.sessions_completed.saturating_add(1);
        }
        self.go_idle();
        Event::WorkCompleted {
            skipped,
            duration_secs,
            sessions_completed: self.sessions_completed,
            at: Utc::now(),
        }
    }

    fn complete_break(&mut self, skipped: bool) -> Event {
        let kind = self.break_kind;
        self.go_idle();
        Event::BreakCompleted {
            kind,
            skipped,
            at: Utc::now(),
        }
    }

    fn go_idle(&mut self) {
        self.state = TimerState::Idle;
        self.remaining_secs = 0;
        self.paused_phase = None;
    }
}

impl Default for TimerEngine {
    fn default() -> Self {
        Self::new(TimerDurations::default())
    }
}
