mod durations;
mod engine;

pub use durations::TimerDurations;
pub use engine::{BreakKind, Phase, TimerEngine, TimerState};
