//! # DeskPlant Core Library
//!
//! This library provides the core logic for DeskPlant, a focus timer whose
//! virtual desk plant thrives on completed sessions and wilts when neglected.
//! Every operation is available to the headless `deskplant` binary; any
//! graphical shell is a thin layer over the same library.
//!
//! ## Architecture
//!
//! - **Timer Engine**: A tick-driven state machine; the caller invokes `tick()`
//!   once per second while a phase is running
//! - **Plant**: Health, growth and neglect decay arithmetic
//! - **Stats**: Per-day totals, weekly view and streaks
//! - **License**: Entitlement gate backed by a remote license server
//! - **Storage**: SQLite key-value persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`TimerEngine`]: Core timer state machine
//! - [`PlantState`]: The plant and its invariants
//! - [`AppCoordinator`]: Wires timer completions to the plant and stats
//! - [`AppRuntime`]: Single-task async driver with event broadcast
//! - [`Config`]: Application configuration management

pub mod clock;
pub mod coordinator;
pub mod error;
pub mod events;
pub mod license;
pub mod notify;
pub mod plant;
pub mod runtime;
pub mod stats;
pub mod storage;
pub mod timer;

pub use clock::{Clock, MockClock, SystemClock};
pub use coordinator::{AppCoordinator, ExportBundle, LicenseOutcome};
pub use error::{ConfigError, CoreError, LicenseError, StorageError, ValidationError};
pub use events::Event;
pub use license::{LemonSqueezyClient, LicenseClient, LicenseGate, LicenseRecord};
pub use notify::{Notifier, Translate};
pub use plant::{HealthStatus, PlantState, PlantType};
pub use runtime::{AppRuntime, Command, RuntimeHandle};
pub use stats::{DailyStat, StatsAggregator};
pub use storage::{Config, KeyValueStore, MemoryStore, Preferences, SqliteStore};
pub use timer::{BreakKind, Phase, TimerDurations, TimerEngine, TimerState};
