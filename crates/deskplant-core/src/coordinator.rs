//! Application context.
//!
//! [`AppCoordinator`] owns every piece of mutable state (timer, plant, stats,
//! license gate, preferences) and the collaborators they talk to. It is
//! constructed once at startup and driven by a single owner, so no state is
//! ever mutated from two places at once.
//!
//! Timer completions flow through [`AppCoordinator::handle_timer_event`]:
//! a full work session waters the plant and records a daily stat, a skipped
//! one only notifies.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::error::{CoreError, LicenseError, Result};
use crate::events::Event;
use crate::license::{
    ActivationResponse, LicenseClient, LicenseGate, ProductIdentity, ValidationResponse,
};
use crate::notify::{KeyTranslator, Message, Notifier, NullNotifier, Translate};
use crate::plant::{PlantState, PlantType};
use crate::stats::{DailyStat, StatsAggregator};
use crate::storage::{
    device_identifier, keys, load_json, save_json, Config, KeyValueStore, Preferences,
};
use crate::timer::{TimerDurations, TimerEngine};

/// Portable snapshot of the plant and its history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub plant_state: PlantState,
    pub daily_stats: Vec<DailyStat>,
    pub export_date: DateTime<Utc>,
}

/// A finished license request, handed back to the owner of the coordinator.
#[derive(Debug, Clone)]
pub enum LicenseOutcome {
    Activation {
        key: String,
        email: String,
        device_name: String,
        result: std::result::Result<ActivationResponse, LicenseError>,
    },
    Validation {
        key: String,
        result: std::result::Result<ValidationResponse, LicenseError>,
    },
}

pub struct AppCoordinator {
    engine: TimerEngine,
    plant: PlantState,
    stats: StatsAggregator,
    gate: LicenseGate,
    preferences: Preferences,
    config: Config,
    /// Where config changes are written. `None` keeps them in memory.
    config_path: Option<PathBuf>,
    store: Box<dyn KeyValueStore>,
    notifier: Arc<dyn Notifier>,
    translator: Arc<dyn Translate>,
    clock: Arc<dyn Clock>,
}

impl AppCoordinator {
    /// Load persisted state and run the startup health check.
    pub fn new(config: Config, store: Box<dyn KeyValueStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    pub fn with_clock(config: Config, store: Box<dyn KeyValueStore>, clock: Arc<dyn Clock>) -> Self {
        let now = clock.now();
        let plant = load_json::<PlantState>(store.as_ref(), keys::PLANT_STATE)
            .map(PlantState::normalized)
            .unwrap_or_else(|| {
                tracing::info!("no stored plant, creating a new one");
                PlantState::new(PlantType::default(), now)
            });
        let stats = StatsAggregator::from_entries(
            load_json(store.as_ref(), keys::DAILY_STATS).unwrap_or_default(),
        );
        let sessions: u32 = load_json(store.as_ref(), keys::SESSIONS_COMPLETED).unwrap_or(0);
        let gate = LicenseGate::load(product_identity(&config), store.as_ref());
        let preferences = Preferences::load(store.as_ref());
        let engine = TimerEngine::new(TimerDurations::default()).with_sessions_completed(sessions);

        let mut coordinator = Self {
            engine,
            plant,
            stats,
            gate,
            preferences,
            config,
            config_path: None,
            store,
            notifier: Arc::new(NullNotifier),
            translator: Arc::new(KeyTranslator),
            clock,
        };
        coordinator.sync_durations();
        coordinator.check_health();
        coordinator.persist_plant();
        coordinator
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn with_translator(mut self, translator: Arc<dyn Translate>) -> Self {
        self.translator = translator;
        self
    }

    /// Save config changes made through the coordinator to `path`.
    pub fn with_config_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config_path = Some(path.into());
        self
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn engine(&self) -> &TimerEngine {
        &self.engine
    }

    pub fn plant(&self) -> &PlantState {
        &self.plant
    }

    pub fn stats(&self) -> &StatsAggregator {
        &self.stats
    }

    pub fn license(&self) -> &LicenseGate {
        &self.gate
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn snapshot(&self) -> Event {
        self.engine.snapshot()
    }

    /// Instance name sent on activation.
    pub fn instance_name(&self) -> Result<String> {
        match &self.config.license.instance_name {
            Some(name) if !name.trim().is_empty() => Ok(name.clone()),
            _ => Ok(device_identifier(self.store.as_ref())?),
        }
    }

    pub fn license_event(&self) -> Event {
        Event::LicenseChanged {
            licensed: self.gate.is_licensed(),
            error: self.gate.last_error().map(|e| e.to_string()),
            at: self.clock.now(),
        }
    }

    // ── Timer ────────────────────────────────────────────────────────

    pub fn start_work(&mut self) -> Vec<Event> {
        self.engine.start_work().into_iter().collect()
    }

    pub fn start_break(&mut self) -> Vec<Event> {
        self.engine.start_break().into_iter().collect()
    }

    pub fn pause(&mut self) -> Vec<Event> {
        self.engine.pause().into_iter().collect()
    }

    pub fn resume(&mut self) -> Vec<Event> {
        self.engine.resume().into_iter().collect()
    }

    pub fn stop(&mut self) -> Vec<Event> {
        self.engine.stop().into_iter().collect()
    }

    pub fn skip(&mut self) -> Vec<Event> {
        match self.engine.skip() {
            Some(event) => self.handle_timer_event(event),
            None => Vec::new(),
        }
    }

    /// One second of the timer driver.
    pub fn tick(&mut self) -> Vec<Event> {
        match self.engine.tick() {
            Some(event) => self.handle_timer_event(event),
            None => Vec::new(),
        }
    }

    /// React to a completion event. Returns it followed by any consequences.
    pub fn handle_timer_event(&mut self, event: Event) -> Vec<Event> {
        let mut out = Vec::with_capacity(2);
        match &event {
            Event::WorkCompleted {
                skipped: false,
                duration_secs,
                sessions_completed,
                ..
            } => {
                let now = self.clock.now();
                self.plant.water(now);
                let minutes = u32::try_from(duration_secs / 60).unwrap_or(u32::MAX);
                self.stats.record(self.clock.today(), minutes);
                tracing::info!(
                    sessions_completed,
                    health = self.plant.health(),
                    level = self.plant.level(),
                    "work session completed, plant watered"
                );
                self.persist_plant();
                self.persist_stats();
                self.persist_sessions();
                out.push(event.clone());
                out.push(Event::PlantWatered {
                    health: self.plant.health(),
                    level: self.plant.level(),
                    total_sessions: self.plant.total_sessions(),
                    at: now,
                });
                self.send(Message::work_complete(self.engine.next_break_kind()));
                return out;
            }
            Event::WorkCompleted { skipped: true, .. } => {
                tracing::info!("work session skipped, no reward");
                self.send(Message::session_skipped());
            }
            Event::BreakCompleted { .. } => {
                self.send(Message::break_complete());
            }
            _ => {}
        }
        out.push(event);
        out
    }

    /// Apply new durations and save them. Requires a license.
    pub fn set_timer_durations(&mut self, durations: TimerDurations) -> Result<()> {
        if !self.gate.can_customize_timer_durations() {
            return Err(CoreError::FeatureLocked("timer durations".into()));
        }
        durations.validate()?;
        let mut config = self.config.clone();
        config.timer.work_minutes = durations.work_secs / 60;
        config.timer.short_break_minutes = durations.short_break_secs / 60;
        config.timer.long_break_minutes = durations.long_break_secs / 60;
        config.timer.sessions_before_long_break = durations.sessions_before_long_break;
        self.replace_config(config)
    }

    /// Set one config value by dot path and save it.
    ///
    /// `timer.*` keys require a license.
    pub fn set_config_value(&mut self, key: &str, value: &str) -> Result<()> {
        if key.starts_with("timer.") && !self.gate.can_customize_timer_durations() {
            return Err(CoreError::FeatureLocked("timer durations".into()));
        }
        let mut config = self.config.clone();
        config.apply(key, value)?;
        self.replace_config(config)
    }

    // ── Plant ────────────────────────────────────────────────────────

    /// Run the neglect decay check.
    pub fn check_health(&mut self) -> Vec<Event> {
        let removed = self.plant.check_health(self.clock.now());
        if removed <= 0.0 {
            return Vec::new();
        }
        tracing::debug!(
            amount = removed,
            health = self.plant.health(),
            "plant decayed"
        );
        vec![Event::PlantDecayed {
            amount: removed,
            health: self.plant.health(),
            status: self.plant.health_status(),
            at: self.clock.now(),
        }]
    }

    /// The slow periodic driver: decay, optional stats pruning, persistence flush.
    pub fn health_tick(&mut self) -> Vec<Event> {
        let events = self.check_health();
        if let Some(days) = self.config.plant.stats_retention_days {
            let cutoff = self.clock.today() - Duration::days(i64::from(days));
            let pruned = self.stats.prune_before(cutoff);
            if pruned > 0 {
                tracing::info!(pruned, %cutoff, "pruned old daily stats");
            }
        }
        self.persist_plant();
        self.persist_stats();
        events
    }

    pub fn set_plant_type(&mut self, plant_type: PlantType) -> Result<()> {
        if !self.gate.can_use_plant(plant_type) {
            return Err(CoreError::FeatureLocked(format!("plant type '{plant_type}'")));
        }
        self.plant.set_plant_type(plant_type);
        self.persist_plant();
        Ok(())
    }

    /// Fresh plant and a zeroed session counter.
    pub fn reset_plant(&mut self) {
        self.plant = PlantState::new(PlantType::default(), self.clock.now());
        self.engine.reset_sessions();
        self.persist_plant();
        self.persist_sessions();
        tracing::info!("plant reset");
    }

    // ── Preferences ──────────────────────────────────────────────────

    pub fn set_preferences(&mut self, preferences: Preferences) -> Result<()> {
        preferences.save(self.store.as_ref())?;
        self.preferences = preferences;
        Ok(())
    }

    // ── Data ─────────────────────────────────────────────────────────

    pub fn export_data(&self) -> Result<String> {
        let bundle = ExportBundle {
            plant_state: self.plant.clone(),
            daily_stats: self.stats.entries().to_vec(),
            export_date: self.clock.now(),
        };
        Ok(serde_json::to_string_pretty(&bundle)?)
    }

    /// Replace plant and stats. Returns `false` and changes nothing if the
    /// data is not a valid bundle.
    pub fn import_data(&mut self, data: &str) -> bool {
        let bundle: ExportBundle = match serde_json::from_str(data) {
            Ok(bundle) => bundle,
            Err(e) => {
                tracing::warn!(error = %e, "import rejected");
                return false;
            }
        };
        self.plant = bundle.plant_state.normalized();
        self.stats = StatsAggregator::from_entries(bundle.daily_stats);
        self.persist_plant();
        self.persist_stats();
        tracing::info!(exported = %bundle.export_date, "data imported");
        true
    }

    // ── License ──────────────────────────────────────────────────────

    pub fn apply_license_outcome(
        &mut self,
        outcome: LicenseOutcome,
    ) -> std::result::Result<(), LicenseError> {
        let result = match outcome {
            LicenseOutcome::Activation {
                key,
                email,
                device_name,
                result,
            } => {
                let now = self.clock.now();
                self.gate.apply_activation(
                    self.store.as_ref(),
                    &key,
                    &email,
                    &device_name,
                    now,
                    result,
                )
            }
            LicenseOutcome::Validation { key, result } => {
                self.gate.apply_validation(self.store.as_ref(), &key, result)
            }
        };
        self.sync_durations();
        result
    }

    pub fn deactivate_license(&mut self) {
        self.gate.deactivate(self.store.as_ref());
        self.sync_durations();
        tracing::info!("license deactivated");
    }

    pub async fn activate_license(
        &mut self,
        client: &dyn LicenseClient,
        key: &str,
        email: &str,
    ) -> Result<()> {
        let device_name = self.instance_name()?;
        let result = client.activate(key, &device_name).await;
        self.apply_license_outcome(LicenseOutcome::Activation {
            key: key.to_string(),
            email: email.to_string(),
            device_name,
            result,
        })?;
        Ok(())
    }

    pub async fn validate_license(&mut self, client: &dyn LicenseClient) -> Result<()> {
        let key = self.gate.stored_key()?;
        let result = client.validate(&key).await;
        self.apply_license_outcome(LicenseOutcome::Validation { key, result })?;
        Ok(())
    }

    // ── Internal ─────────────────────────────────────────────────────

    fn replace_config(&mut self, config: Config) -> Result<()> {
        if let Some(path) = &self.config_path {
            config.save_to(path)?;
        }
        self.config = config;
        self.sync_durations();
        Ok(())
    }

    /// Custom durations only apply while licensed.
    fn sync_durations(&mut self) {
        let durations = if self.gate.can_customize_timer_durations() {
            self.config.durations()
        } else {
            TimerDurations::default()
        };
        if let Err(e) = self.engine.set_durations(durations) {
            tracing::warn!(error = %e, "configured durations rejected, keeping current");
        }
    }

    fn send(&self, message: Message) {
        message.send(
            self.notifier.as_ref(),
            self.translator.as_ref(),
            self.preferences.sound_enabled,
        );
    }

    fn persist_plant(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::PLANT_STATE, &self.plant) {
            tracing::warn!(error = %e, "failed to save plant state");
        }
    }

    fn persist_stats(&self) {
        if let Err(e) = save_json(self.store.as_ref(), keys::DAILY_STATS, &self.stats) {
            tracing::warn!(error = %e, "failed to save daily stats");
        }
    }

    fn persist_sessions(&self) {
        let sessions = self.engine.sessions_completed();
        if let Err(e) = save_json(self.store.as_ref(), keys::SESSIONS_COMPLETED, &sessions) {
            tracing::warn!(error = %e, "failed to save session count");
        }
    }
}

fn product_identity(config: &Config) -> ProductIdentity {
    ProductIdentity {
        store_id: config.license.store_id,
        product_id: config.license.product_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::MockClock;
    use crate::license::{LicenseInstance, LicenseMeta};
    use crate::notify::{keys as notify_keys, RecordingNotifier};
    use crate::storage::MemoryStore;
    use crate::timer::TimerState;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, 9, 0, 0).unwrap()
    }

    struct Harness {
        coordinator: AppCoordinator,
        store: Arc<MemoryStore>,
        clock: MockClock,
        notifier: RecordingNotifier,
    }

    fn harness() -> Harness {
        harness_with(Config::default(), Arc::new(MemoryStore::new()))
    }

    fn harness_with(config: Config, store: Arc<MemoryStore>) -> Harness {
        let clock = MockClock::new(t0());
        let notifier = RecordingNotifier::new();
        let coordinator =
            AppCoordinator::with_clock(config, Box::new(store.clone()), Arc::new(clock.clone()))
                .with_notifier(Arc::new(notifier.clone()));
        Harness {
            coordinator,
            store,
            clock,
            notifier,
        }
    }

    fn run_to_completion(c: &mut AppCoordinator) -> Vec<Event> {
        let mut events = Vec::new();
        while c.engine().is_running() {
            events.extend(c.tick());
        }
        events
    }

    fn activation_ok(email: &str) -> ActivationResponse {
        ActivationResponse {
            activated: true,
            error: None,
            license_key: None,
            instance: Some(LicenseInstance {
                id: "inst-1".into(),
                name: "deskplant-test".into(),
                created_at: None,
            }),
            meta: Some(LicenseMeta {
                store_id: 53624,
                product_id: 720905,
                customer_email: email.into(),
                order_id: None,
                variant_id: None,
                variant_name: None,
                product_name: None,
                customer_id: None,
                customer_name: None,
            }),
        }
    }

    fn license(c: &mut AppCoordinator) {
        c.apply_license_outcome(LicenseOutcome::Activation {
            key: "KEY-1".into(),
            email: "ada@example.com".into(),
            device_name: "deskplant-test".into(),
            result: Ok(activation_ok("ada@example.com")),
        })
        .unwrap();
    }

    #[test]
    fn full_session_waters_and_records() {
        let mut h = harness();
        let c = &mut h.coordinator;
        c.start_work();
        let events = run_to_completion(c);

        assert_eq!(c.engine().state(), TimerState::Idle);
        assert_eq!(c.engine().sessions_completed(), 1);
        assert_eq!(c.plant().total_sessions(), 1);
        let today = c.stats().today_stats(t0().date_naive()).unwrap();
        assert_eq!(today.sessions_completed, 1);
        assert_eq!(today.total_minutes, 25);
        assert!(matches!(
            events[0],
            Event::WorkCompleted { skipped: false, .. }
        ));
        assert!(matches!(events[1], Event::PlantWatered { total_sessions: 1, .. }));

        let sent = h.notifier.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].title, notify_keys::WORK_COMPLETE_TITLE);
        assert_eq!(sent[0].body, notify_keys::WORK_COMPLETE_BODY_SHORT);
        assert!(sent[0].with_sound);

        let stored: PlantState = load_json(h.store.as_ref(), keys::PLANT_STATE).unwrap();
        assert_eq!(stored.total_sessions(), 1);
        let sessions: u32 = load_json(h.store.as_ref(), keys::SESSIONS_COMPLETED).unwrap();
        assert_eq!(sessions, 1);
    }

    #[test]
    fn skipped_session_does_not_water() {
        let mut h = harness();
        let c = &mut h.coordinator;
        c.start_work();
        for _ in 0..700 {
            c.tick();
        }
        assert_eq!(c.engine().remaining_secs(), 800);
        let health_before = c.plant().health();

        let events = c.skip();
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::WorkCompleted { skipped: true, .. }));
        assert_eq!(c.engine().sessions_completed(), 0);
        assert_eq!(c.plant().total_sessions(), 0);
        assert_eq!(c.plant().health(), health_before);
        assert!(c.stats().entries().is_empty());
        assert_eq!(h.notifier.sent()[0].title, notify_keys::SESSION_SKIPPED_TITLE);
    }

    #[test]
    fn break_completion_only_notifies() {
        let mut h = harness();
        let c = &mut h.coordinator;
        c.start_break();
        let events = run_to_completion(c);
        assert_eq!(events.len(), 1);
        assert!(matches!(events[0], Event::BreakCompleted { skipped: false, .. }));
        assert_eq!(c.plant().total_sessions(), 0);
        assert_eq!(h.notifier.sent()[0].title, notify_keys::BREAK_COMPLETE_TITLE);
    }

    #[test]
    fn sound_follows_preference() {
        let mut h = harness();
        let prefs = Preferences {
            sound_enabled: false,
            ..Preferences::default()
        };
        h.coordinator.set_preferences(prefs).unwrap();
        h.coordinator.start_break();
        h.coordinator.skip();
        assert!(!h.notifier.sent()[0].with_sound);
        assert!(!Preferences::load(h.store.as_ref()).sound_enabled);
    }

    #[test]
    fn state_survives_restart() {
        let store = Arc::new(MemoryStore::new());
        let mut h = harness_with(Config::default(), store.clone());
        h.coordinator.start_work();
        run_to_completion(&mut h.coordinator);
        drop(h);

        let h = harness_with(Config::default(), store);
        assert_eq!(h.coordinator.plant().total_sessions(), 1);
        assert_eq!(h.coordinator.engine().sessions_completed(), 1);
        assert_eq!(h.coordinator.stats().entries().len(), 1);
        assert_eq!(h.coordinator.engine().state(), TimerState::Idle);
    }

    #[test]
    fn health_tick_decays_after_grace_period() {
        let mut h = harness();
        h.clock.advance(Duration::hours(3));
        assert!(h.coordinator.health_tick().is_empty());

        h.clock.advance(Duration::hours(3));
        let events = h.coordinator.health_tick();
        // 2h past grace at bonsai's 1.2 wither rate.
        match &events[0] {
            Event::PlantDecayed { amount, health, .. } => {
                assert!((amount - 4.8).abs() < 1e-9);
                assert!((health - 95.2).abs() < 1e-9);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn startup_check_applies_decay() {
        let store = Arc::new(MemoryStore::new());
        let stale = PlantState::new(PlantType::Cactus, t0() - Duration::hours(14));
        save_json(store.as_ref(), keys::PLANT_STATE, &stale).unwrap();

        let h = harness_with(Config::default(), store);
        // 10h past grace at cactus's 0.7 wither rate.
        assert!((h.coordinator.plant().health() - 86.0).abs() < 1e-9);
    }

    #[test]
    fn health_tick_prunes_when_retention_set() {
        let mut config = Config::default();
        config.plant.stats_retention_days = Some(7);
        let store = Arc::new(MemoryStore::new());
        let old = vec![DailyStat {
            date: t0().date_naive() - Duration::days(30),
            sessions_completed: 2,
            total_minutes: 50,
        }];
        save_json(store.as_ref(), keys::DAILY_STATS, &old).unwrap();

        let mut h = harness_with(config, store);
        assert_eq!(h.coordinator.stats().entries().len(), 1);
        h.coordinator.health_tick();
        assert!(h.coordinator.stats().entries().is_empty());
    }

    #[test]
    fn plant_type_is_gated() {
        let mut h = harness();
        let c = &mut h.coordinator;
        assert!(matches!(
            c.set_plant_type(PlantType::Sakura),
            Err(CoreError::FeatureLocked(_))
        ));
        c.set_plant_type(PlantType::Cactus).unwrap();
        assert_eq!(c.plant().plant_type(), PlantType::Cactus);

        license(c);
        c.set_plant_type(PlantType::Sakura).unwrap();
        assert_eq!(c.plant().plant_type(), PlantType::Sakura);
    }

    #[test]
    fn custom_durations_require_license() {
        let mut h = harness();
        let c = &mut h.coordinator;
        let durations = TimerDurations::from_minutes(50, 10, 20);
        assert!(matches!(
            c.set_timer_durations(durations),
            Err(CoreError::FeatureLocked(_))
        ));

        license(c);
        c.set_timer_durations(durations).unwrap();
        assert_eq!(c.engine().durations().work_secs, 3000);
        assert_eq!(c.config().timer.work_minutes, 50);

        c.deactivate_license();
        assert_eq!(c.engine().durations().work_secs, 1500);
    }

    #[test]
    fn custom_durations_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let store = Arc::new(MemoryStore::new());
        let mut h = harness_with(Config::load_from(&path).unwrap(), store.clone());
        h.coordinator = h.coordinator.with_config_path(&path);
        license(&mut h.coordinator);
        h.coordinator
            .set_timer_durations(TimerDurations::from_minutes(50, 10, 20))
            .unwrap();

        let reloaded = harness_with(Config::load_from(&path).unwrap(), store);
        assert_eq!(reloaded.coordinator.config().timer.work_minutes, 50);
        assert_eq!(reloaded.coordinator.engine().durations().work_secs, 3000);
    }

    #[test]
    fn config_values_are_gated_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut h = harness();
        h.coordinator = h.coordinator.with_config_path(&path);
        let c = &mut h.coordinator;

        assert!(matches!(
            c.set_config_value("timer.work_minutes", "45"),
            Err(CoreError::FeatureLocked(_))
        ));
        assert!(!path.exists());

        c.set_config_value("plant.stats_retention_days", "30").unwrap();
        assert_eq!(
            Config::load_from(&path).unwrap().plant.stats_retention_days,
            Some(30)
        );

        license(c);
        c.set_config_value("timer.work_minutes", "45").unwrap();
        assert_eq!(c.engine().durations().work_secs, 2700);
        assert!(c.set_config_value("timer.work_minutes", "400000000000000000").is_err());
        assert_eq!(Config::load_from(&path).unwrap().timer.work_minutes, 45);
    }

    #[test]
    fn unlicensed_ignores_configured_durations() {
        let mut config = Config::default();
        config.timer.work_minutes = 45;
        let h = harness_with(config, Arc::new(MemoryStore::new()));
        assert_eq!(h.coordinator.engine().durations().work_secs, 1500);
    }

    #[test]
    fn license_failure_is_reported() {
        let mut h = harness();
        let err = h
            .coordinator
            .apply_license_outcome(LicenseOutcome::Activation {
                key: "KEY-1".into(),
                email: "bob@example.com".into(),
                device_name: "dev".into(),
                result: Ok(activation_ok("ada@example.com")),
            })
            .unwrap_err();
        assert_eq!(err, LicenseError::EmailMismatch);
        match h.coordinator.license_event() {
            Event::LicenseChanged { licensed, error, .. } => {
                assert!(!licensed);
                assert!(error.is_some());
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn reset_restores_defaults() {
        let mut h = harness();
        let c = &mut h.coordinator;
        c.start_work();
        run_to_completion(c);
        c.reset_plant();
        assert_eq!(c.plant().total_sessions(), 0);
        assert_eq!(c.plant().plant_type(), PlantType::Bonsai);
        assert_eq!(c.engine().sessions_completed(), 0);
        let sessions: u32 = load_json(h.store.as_ref(), keys::SESSIONS_COMPLETED).unwrap();
        assert_eq!(sessions, 0);
    }

    #[test]
    fn export_then_import_into_fresh_store() {
        let mut h = harness();
        h.coordinator.start_work();
        run_to_completion(&mut h.coordinator);
        let exported = h.coordinator.export_data().unwrap();
        assert!(exported.contains("\"plantState\""));
        assert!(exported.contains("\"exportDate\""));

        let mut fresh = harness();
        assert!(fresh.coordinator.import_data(&exported));
        assert_eq!(fresh.coordinator.plant().total_sessions(), 1);
        assert_eq!(fresh.coordinator.stats().total_sessions(), 1);
        let stored: PlantState = load_json(fresh.store.as_ref(), keys::PLANT_STATE).unwrap();
        assert_eq!(stored.total_sessions(), 1);
    }

    #[test]
    fn bad_import_changes_nothing() {
        let mut h = harness();
        let before = h.coordinator.plant().clone();
        assert!(!h.coordinator.import_data("{\"plantState\": 3}"));
        assert_eq!(h.coordinator.plant(), &before);
    }

    #[test]
    fn instance_name_prefers_config() {
        let h = harness();
        let generated = h.coordinator.instance_name().unwrap();
        assert!(generated.starts_with("deskplant-"));
        assert_eq!(h.coordinator.instance_name().unwrap(), generated);

        let mut config = Config::default();
        config.license.instance_name = Some("work-laptop".into());
        let h = harness_with(config, Arc::new(MemoryStore::new()));
        assert_eq!(h.coordinator.instance_name().unwrap(), "work-laptop");
    }
}
