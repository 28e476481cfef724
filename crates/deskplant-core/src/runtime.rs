//! Cooperative runtime.
//!
//! One tokio task owns the [`AppCoordinator`] and is the only place its state
//! changes. It selects over the one-second timer driver, the slow health
//! driver, incoming [`Command`]s, and finished license requests. License
//! network calls run in their own tasks and post their results back, so a
//! slow server never delays a tick.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio::time::{interval, interval_at, Instant, MissedTickBehavior};

use crate::coordinator::{AppCoordinator, LicenseOutcome};
use crate::error::{CoreError, Result};
use crate::events::Event;
use crate::license::LicenseClient;
use crate::plant::PlantType;

const TICK: Duration = Duration::from_secs(1);
const COMMAND_CAPACITY: usize = 64;
const EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    StartWork,
    StartBreak,
    Pause,
    Resume,
    Stop,
    Skip,
    /// Publish the current timer state.
    Snapshot,
    SetPlantType(PlantType),
    ActivateLicense { key: String, email: String },
    ValidateLicense,
    DeactivateLicense,
    Shutdown,
}

/// Cloneable access to a running [`AppRuntime`].
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: mpsc::Sender<Command>,
    events: broadcast::Sender<Event>,
}

impl RuntimeHandle {
    pub async fn send(&self, command: Command) -> Result<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| CoreError::Custom("runtime is not running".into()))
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.events.subscribe()
    }
}

pub struct AppRuntime {
    coordinator: AppCoordinator,
    client: Arc<dyn LicenseClient>,
    commands: mpsc::Receiver<Command>,
    outcomes_tx: mpsc::Sender<LicenseOutcome>,
    outcomes_rx: mpsc::Receiver<LicenseOutcome>,
    events: broadcast::Sender<Event>,
    validate_on_start: bool,
}

impl AppRuntime {
    pub fn new(coordinator: AppCoordinator, client: Arc<dyn LicenseClient>) -> (Self, RuntimeHandle) {
        let (tx, commands) = mpsc::channel(COMMAND_CAPACITY);
        let (outcomes_tx, outcomes_rx) = mpsc::channel(8);
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        let handle = RuntimeHandle {
            tx,
            events: events.clone(),
        };
        let runtime = Self {
            coordinator,
            client,
            commands,
            outcomes_tx,
            outcomes_rx,
            events,
            validate_on_start: true,
        };
        (runtime, handle)
    }

    /// Skip the startup check of a stored license.
    pub fn without_startup_validation(mut self) -> Self {
        self.validate_on_start = false;
        self
    }

    /// Run until [`Command::Shutdown`] or every handle is dropped. Returns the
    /// coordinator with its final state.
    pub async fn run(mut self) -> AppCoordinator {
        let health_every =
            Duration::from_secs(self.coordinator.config().plant.health_check_interval_secs.max(1));
        let mut ticker = interval(TICK);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut health = interval_at(Instant::now() + health_every, health_every);
        health.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::info!(
            health_every_secs = health_every.as_secs(),
            licensed = self.coordinator.license().is_licensed(),
            "runtime started"
        );
        if self.validate_on_start && self.coordinator.license().record().is_some() {
            self.spawn_validation();
        }

        loop {
            tokio::select! {
                _ = ticker.tick(), if self.coordinator.engine().is_running() => {
                    let events = self.coordinator.tick();
                    self.publish(events);
                }
                _ = health.tick() => {
                    let events = self.coordinator.health_tick();
                    self.publish(events);
                }
                command = self.commands.recv() => {
                    match command {
                        None | Some(Command::Shutdown) => break,
                        Some(command) => self.handle(command, &mut ticker),
                    }
                }
                Some(outcome) = self.outcomes_rx.recv() => {
                    // Errors are already logged by the gate and carried in the event.
                    let _ = self.coordinator.apply_license_outcome(outcome);
                    let event = self.coordinator.license_event();
                    self.publish(vec![event]);
                }
            }
        }

        self.coordinator.health_tick();
        tracing::info!("runtime stopped");
        self.coordinator
    }

    fn handle(&mut self, command: Command, ticker: &mut tokio::time::Interval) {
        tracing::debug!(?command, "command");
        let events = match command {
            Command::StartWork => self.coordinator.start_work(),
            Command::StartBreak => self.coordinator.start_break(),
            Command::Pause => self.coordinator.pause(),
            Command::Resume => self.coordinator.resume(),
            Command::Stop => self.coordinator.stop(),
            Command::Skip => self.coordinator.skip(),
            Command::Snapshot => vec![self.coordinator.snapshot()],
            Command::SetPlantType(plant_type) => {
                let at = self.coordinator.clock().now();
                match self.coordinator.set_plant_type(plant_type) {
                    Ok(()) => vec![Event::PlantTypeChanged { plant_type, at }],
                    Err(e) => {
                        tracing::warn!(error = %e, "plant type not changed");
                        vec![Event::CommandRejected {
                            command: "set_plant_type".into(),
                            reason: e.to_string(),
                            at,
                        }]
                    }
                }
            }
            Command::ActivateLicense { key, email } => {
                self.spawn_activation(key, email);
                Vec::new()
            }
            Command::ValidateLicense => {
                self.spawn_validation();
                Vec::new()
            }
            Command::DeactivateLicense => {
                self.coordinator.deactivate_license();
                vec![self.coordinator.license_event()]
            }
            Command::Shutdown => Vec::new(),
        };

        // A phase that just started or resumed gets a full second before its first tick.
        let phase_started = events.iter().any(|e| {
            matches!(
                e,
                Event::WorkStarted { .. } | Event::BreakStarted { .. } | Event::TimerResumed { .. }
            )
        });
        if phase_started {
            ticker.reset();
        }
        self.publish(events);
    }

    fn publish(&self, events: Vec<Event>) {
        for event in events {
            // No subscribers is fine.
            let _ = self.events.send(event);
        }
    }

    fn spawn_activation(&self, key: String, email: String) {
        let device_name = match self.coordinator.instance_name() {
            Ok(name) => name,
            Err(e) => {
                tracing::warn!(error = %e, "no instance name, activation not sent");
                return;
            }
        };
        let client = Arc::clone(&self.client);
        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = client.activate(&key, &device_name).await;
            let outcome = LicenseOutcome::Activation {
                key,
                email,
                device_name,
                result,
            };
            if tx.send(outcome).await.is_err() {
                tracing::debug!("runtime gone before activation finished");
            }
        });
    }

    fn spawn_validation(&self) {
        let key = match self.coordinator.license().stored_key() {
            Ok(key) => key,
            Err(e) => {
                tracing::debug!(error = %e, "nothing to validate");
                return;
            }
        };
        let client = Arc::clone(&self.client);
        let tx = self.outcomes_tx.clone();
        tokio::spawn(async move {
            let result = client.validate(&key).await;
            if tx.send(LicenseOutcome::Validation { key, result }).await.is_err() {
                tracing::debug!("runtime gone before validation finished");
            }
        });
    }
}
