//! The active-monitor scheduler.
//!
//! One tick loop owns the live monitor set. Each pass submits due monitors
//! through the concurrency gate to the check executor; completions flow
//! through the state machine, are persisted, and fan out as events and
//! notifications. Structural changes from the API (add/remove/update)
//! serialize against ticks through the same mutex, so a pass never sees a
//! half-updated entry.

use chrono::{DateTime, Utc};
use rand::Rng;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::time::interval;
use upmon_common::types::{
    AlertEvent, CheckResult, MonitorConfig, MonitorDef, MonitorState, StateRecord,
};
use upmon_monitor::args::{self, ArgError};
use upmon_monitor::event::{EventBroker, MonitorEvent};
use upmon_monitor::runner::CheckExecutor;
use upmon_monitor::transition;
use upmon_notify::manager::NotificationManager;
use upmon_storage::{MonitorStore, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("unknown monitor: {0}")]
    UnknownMonitor(String),
    #[error("unknown monitor definition: {0}")]
    UnknownDefinition(String),
    #[error("monitor definition {0} is in use")]
    DefinitionInUse(String),
    #[error(transparent)]
    InvalidArguments(#[from] ArgError),
    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Scheduling state derived per monitor; created when the monitor becomes
/// active, destroyed when it is removed.
#[derive(Debug, Clone)]
pub struct ScheduleEntry {
    pub next_due: DateTime<Utc>,
    /// Prevents double-submission of the same monitor.
    pub running: bool,
    pub last_check: Option<DateTime<Utc>>,
}

struct MonitorEntry {
    config: MonitorConfig,
    def: Arc<MonitorDef>,
    expanded_args: Vec<String>,
    description: String,
    state: StateRecord,
    schedule: ScheduleEntry,
}

impl MonitorEntry {
    fn build(
        config: MonitorConfig,
        def: Arc<MonitorDef>,
        state: StateRecord,
        next_due: DateTime<Utc>,
    ) -> Result<Self, ArgError> {
        let expanded_args =
            args::expand_cmdline(&def.cmdline_args_tmpl, &def.arg_specs, &config.args)?;
        let description =
            args::render_description(&def.description_tmpl, &def.arg_specs, &config.args);
        Ok(Self {
            config,
            def,
            expanded_args,
            description,
            state,
            schedule: ScheduleEntry {
                next_due,
                running: false,
                last_check: None,
            },
        })
    }
}

/// Counters surfaced through the status API.
#[derive(Default)]
pub struct SchedulerStats {
    pub total_checks: AtomicU64,
    pub deferred: AtomicU64,
    pub checks_up: AtomicU64,
    pub checks_down: AtomicU64,
    pub checks_unknown: AtomicU64,
}

/// Point-in-time view of one live monitor, for the API.
#[derive(Debug, Clone, serde::Serialize)]
pub struct MonitorSnapshot {
    pub id: String,
    pub def_id: String,
    pub description: String,
    pub interval_secs: u64,
    pub threshold: u32,
    pub checks_enabled: bool,
    pub alerts_enabled: bool,
    pub args: HashMap<String, String>,
    pub metadata: HashMap<String, String>,
    pub state: StateRecord,
    pub next_due: DateTime<Utc>,
    pub running: bool,
    pub last_check: Option<DateTime<Utc>>,
}

pub struct MonitorScheduler {
    monitors: Mutex<HashMap<String, MonitorEntry>>,
    defs: Mutex<HashMap<String, Arc<MonitorDef>>>,
    /// Monitors excluded from scheduling with their configuration error.
    invalid: Mutex<HashMap<String, String>>,
    store: Arc<MonitorStore>,
    executor: Arc<dyn CheckExecutor>,
    notifier: Arc<NotificationManager>,
    broker: EventBroker,
    gate: Arc<Semaphore>,
    tick: Duration,
    check_timeout: Duration,
    pub stats: SchedulerStats,
}

impl MonitorScheduler {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        store: Arc<MonitorStore>,
        executor: Arc<dyn CheckExecutor>,
        notifier: Arc<NotificationManager>,
        broker: EventBroker,
        max_concurrent_checks: usize,
        tick: Duration,
        check_timeout: Duration,
    ) -> Self {
        Self {
            monitors: Mutex::new(HashMap::new()),
            defs: Mutex::new(HashMap::new()),
            invalid: Mutex::new(HashMap::new()),
            store,
            executor,
            notifier,
            broker,
            gate: Arc::new(Semaphore::new(max_concurrent_checks)),
            tick,
            check_timeout,
            stats: SchedulerStats::default(),
        }
    }

    fn lock_monitors(&self) -> MutexGuard<'_, HashMap<String, MonitorEntry>> {
        self.monitors
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_defs(&self) -> MutexGuard<'_, HashMap<String, Arc<MonitorDef>>> {
        self.defs
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_invalid(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.invalid
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Load definitions, monitors, and persisted state from storage.
    ///
    /// Monitors with unresolvable arguments are excluded from scheduling
    /// and recorded as per-monitor configuration errors; one bad monitor
    /// never affects the others. Initial due times are spread randomly
    /// across one interval so checks do not bunch up after a restart.
    pub fn load(&self) -> Result<(), SchedulerError> {
        let defs: HashMap<String, Arc<MonitorDef>> = self
            .store
            .list_monitor_defs()?
            .into_iter()
            .map(|def| (def.id.clone(), Arc::new(def)))
            .collect();
        let stored = self.store.list_monitors()?;

        let now = Utc::now();
        let mut rng = rand::thread_rng();
        let mut monitors = HashMap::new();
        let mut invalid = HashMap::new();

        for (config, state) in stored {
            let monitor_id = config.id.clone();
            let Some(def) = defs.get(&config.def_id) else {
                let error = format!("unknown monitor definition: {}", config.def_id);
                tracing::error!(monitor_id = %monitor_id, error = %error, "Monitor excluded from scheduling");
                invalid.insert(monitor_id, error);
                continue;
            };
            let spread = rng.gen_range(0..=config.interval_secs.max(1)) as i64;
            let next_due = now + chrono::Duration::seconds(spread);
            match MonitorEntry::build(config, def.clone(), state, next_due) {
                Ok(entry) => {
                    monitors.insert(monitor_id, entry);
                }
                Err(e) => {
                    tracing::error!(
                        monitor_id = %monitor_id,
                        error = %e,
                        "Monitor has invalid arguments, excluded from scheduling"
                    );
                    invalid.insert(monitor_id, e.to_string());
                }
            }
        }

        tracing::info!(
            defs = defs.len(),
            monitors = monitors.len(),
            invalid = invalid.len(),
            "Loaded active monitors"
        );
        *self.lock_defs() = defs;
        *self.lock_monitors() = monitors;
        *self.lock_invalid() = invalid;
        Ok(())
    }

    /// The scheduling loop. Never returns; the caller aborts the task on
    /// shutdown.
    pub async fn run(self: Arc<Self>) {
        tracing::info!(
            tick = ?self.tick,
            check_timeout = ?self.check_timeout,
            max_concurrent = self.gate.available_permits(),
            "Monitor scheduler started"
        );
        let mut tick = interval(self.tick);
        loop {
            tick.tick().await;
            self.clone().tick_once(Utc::now());
        }
    }

    /// One scheduling pass: submit every due monitor that can claim a
    /// concurrency permit. Entries that cannot get a permit stay due and
    /// are retried on the next pass. The pass itself never blocks on a
    /// check.
    pub fn tick_once(self: Arc<Self>, now: DateTime<Utc>) {
        struct DueCheck {
            monitor_id: String,
            command: String,
            argv: Vec<String>,
            interval_secs: u64,
            permit: OwnedSemaphorePermit,
        }

        let due: Vec<DueCheck> = {
            let mut monitors = self.lock_monitors();
            let mut due = Vec::new();
            for (id, entry) in monitors.iter_mut() {
                if !entry.config.checks_enabled
                    || entry.schedule.running
                    || entry.schedule.next_due > now
                {
                    continue;
                }
                match self.gate.clone().try_acquire_owned() {
                    Ok(permit) => {
                        entry.schedule.running = true;
                        due.push(DueCheck {
                            monitor_id: id.clone(),
                            command: entry.def.cmdline_filename.clone(),
                            argv: entry.expanded_args.clone(),
                            interval_secs: entry.config.interval_secs,
                            permit,
                        });
                    }
                    Err(_) => {
                        self.stats.deferred.fetch_add(1, Ordering::Relaxed);
                    }
                }
            }
            due
        };

        for check in due {
            self.stats.total_checks.fetch_add(1, Ordering::Relaxed);
            self.broker.publish(MonitorEvent::Scheduled {
                monitor_id: check.monitor_id.clone(),
                interval_secs: check.interval_secs,
                timestamp: now,
            });
            let scheduler = self.clone();
            tokio::spawn(async move {
                let result = scheduler
                    .executor
                    .execute(&check.command, &check.argv, scheduler.check_timeout)
                    .await;
                scheduler.apply_result(&check.monitor_id, result);
                // Permit released on every exit path once the check is done.
                drop(check.permit);
            });
        }
    }

    /// Feed one completed check back into the monitor's state.
    fn apply_result(&self, monitor_id: &str, result: CheckResult) {
        match result.state {
            MonitorState::Up => self.stats.checks_up.fetch_add(1, Ordering::Relaxed),
            MonitorState::Down => self.stats.checks_down.fetch_add(1, Ordering::Relaxed),
            MonitorState::Unknown => self.stats.checks_unknown.fetch_add(1, Ordering::Relaxed),
        };

        let now = Utc::now();
        struct Outcome {
            state: StateRecord,
            transition: Option<transition::StateTransition>,
            alerts_enabled: bool,
            description: String,
            metadata: HashMap<String, String>,
            arguments: HashMap<String, String>,
        }

        let outcome = {
            let mut monitors = self.lock_monitors();
            let Some(entry) = monitors.get_mut(monitor_id) else {
                tracing::debug!(
                    monitor_id = %monitor_id,
                    "Discarding check result for removed monitor"
                );
                return;
            };
            entry.schedule.running = false;
            entry.schedule.last_check = Some(now);
            // The new due time is independent of how long the check took,
            // so slow checks do not compound delay beyond one interval.
            entry.schedule.next_due =
                now + chrono::Duration::seconds(entry.config.interval_secs.max(1) as i64);

            let (state, transition) =
                transition::apply(&entry.state, &result, entry.config.threshold, now);
            entry.state = state.clone();
            Outcome {
                state,
                transition,
                alerts_enabled: entry.config.alerts_enabled,
                description: entry.description.clone(),
                metadata: entry.config.metadata.clone(),
                arguments: args::merged_args(&entry.def.arg_specs, &entry.config.args),
            }
        };

        if let Err(e) = self.store.save_state(monitor_id, &outcome.state) {
            tracing::error!(monitor_id = %monitor_id, error = %e, "Failed to persist monitor state");
        }
        self.broker.publish(MonitorEvent::CheckFinished {
            monitor_id: monitor_id.to_string(),
            result: result.clone(),
        });

        let Some(transition) = outcome.transition else {
            return;
        };

        tracing::info!(
            monitor_id = %monitor_id,
            previous = %transition.previous,
            new = %outcome.state.announced,
            message = %result.message,
            "Monitor changed state"
        );

        let alert = AlertEvent {
            id: upmon_common::id::next_id(),
            monitor_id: monitor_id.to_string(),
            monitor_description: outcome.description,
            previous_state: transition.previous,
            new_state: outcome.state.announced,
            previous_state_duration_secs: transition.previous_duration_secs,
            message: result.message.clone(),
            metadata: outcome.metadata,
            arguments: outcome.arguments,
            timestamp: now,
        };

        if transition.previous == MonitorState::Down {
            if let Err(e) = self.store.close_open_alerts(monitor_id, now) {
                tracing::error!(monitor_id = %monitor_id, error = %e, "Failed to close alert row");
            }
        }
        if outcome.state.announced == MonitorState::Down {
            if let Err(e) = self
                .store
                .open_alert(&alert.id, monitor_id, now, &result.message)
            {
                tracing::error!(monitor_id = %monitor_id, error = %e, "Failed to open alert row");
            }
        }

        self.broker.publish(MonitorEvent::StateChange {
            monitor_id: monitor_id.to_string(),
            alert: alert.clone(),
        });

        if !outcome.alerts_enabled {
            tracing::debug!(monitor_id = %monitor_id, "Alerts disabled, notification suppressed");
            return;
        }

        // Notification delivery may be slow; never wait for it in the
        // check-completion path.
        let store = self.store.clone();
        let notifier = self.notifier.clone();
        let monitor_id = monitor_id.to_string();
        tokio::spawn(async move {
            let contacts = match store.contacts_for_monitor(&monitor_id) {
                Ok(contacts) => contacts,
                Err(e) => {
                    tracing::error!(monitor_id = %monitor_id, error = %e, "Failed to resolve contacts");
                    Vec::new()
                }
            };
            notifier.notify(&alert, &contacts).await;
        });
    }

    // ---- reconfiguration (serialized against ticks via the monitor map) ----

    /// Add a monitor to the live set. The monitor is validated against its
    /// definition, persisted, and due immediately.
    pub fn activate_monitor(&self, config: MonitorConfig) -> Result<(), SchedulerError> {
        let def = self
            .lock_defs()
            .get(&config.def_id)
            .cloned()
            .ok_or_else(|| SchedulerError::UnknownDefinition(config.def_id.clone()))?;
        let monitor_id = config.id.clone();
        let state = StateRecord::new(Utc::now());
        let entry = MonitorEntry::build(config, def, state.clone(), Utc::now())?;
        self.store.insert_monitor(&entry.config, &state)?;
        tracing::info!(monitor_id = %monitor_id, def_id = %entry.config.def_id, "Created active monitor");
        self.lock_monitors().insert(monitor_id, entry);
        Ok(())
    }

    /// Remove a monitor. If a check is in flight its result is discarded;
    /// the database row is marked deleted and purged on the next startup.
    pub fn remove_monitor(&self, monitor_id: &str) -> Result<(), SchedulerError> {
        let removed = self.lock_monitors().remove(monitor_id);
        match removed {
            Some(entry) if entry.schedule.running => {
                self.store.mark_monitor_deleted(monitor_id)?;
            }
            Some(_) => {
                self.store.purge_monitor(monitor_id)?;
            }
            None => {
                if self.lock_invalid().remove(monitor_id).is_some() {
                    self.store.purge_monitor(monitor_id)?;
                } else {
                    return Err(SchedulerError::UnknownMonitor(monitor_id.to_string()));
                }
            }
        }
        tracing::info!(monitor_id = %monitor_id, "Removed active monitor");
        Ok(())
    }

    /// Replace a monitor's argument overrides. Also the path that brings a
    /// monitor excluded for a configuration error back into scheduling.
    pub fn update_monitor_args(
        &self,
        monitor_id: &str,
        new_args: HashMap<String, String>,
    ) -> Result<(), SchedulerError> {
        {
            let mut monitors = self.lock_monitors();
            if let Some(entry) = monitors.get_mut(monitor_id) {
                let expanded = args::expand_cmdline(
                    &entry.def.cmdline_args_tmpl,
                    &entry.def.arg_specs,
                    &new_args,
                )?;
                entry.description = args::render_description(
                    &entry.def.description_tmpl,
                    &entry.def.arg_specs,
                    &new_args,
                );
                entry.expanded_args = expanded;
                entry.config.args = new_args.clone();
                drop(monitors);
                self.store.update_monitor_args(monitor_id, &new_args)?;
                return Ok(());
            }
        }

        if self.lock_invalid().contains_key(monitor_id) {
            let (mut config, state) = self
                .store
                .list_monitors()?
                .into_iter()
                .find(|(c, _)| c.id == monitor_id)
                .ok_or_else(|| SchedulerError::UnknownMonitor(monitor_id.to_string()))?;
            let def = self
                .lock_defs()
                .get(&config.def_id)
                .cloned()
                .ok_or_else(|| SchedulerError::UnknownDefinition(config.def_id.clone()))?;
            config.args = new_args.clone();
            let entry = MonitorEntry::build(config, def, state, Utc::now())?;
            self.store.update_monitor_args(monitor_id, &new_args)?;
            self.lock_monitors().insert(monitor_id.to_string(), entry);
            self.lock_invalid().remove(monitor_id);
            tracing::info!(monitor_id = %monitor_id, "Monitor arguments fixed, scheduling resumed");
            return Ok(());
        }

        Err(SchedulerError::UnknownMonitor(monitor_id.to_string()))
    }

    /// Suspend or resume checks. The schedule entry survives, so resuming
    /// picks up from the existing due time.
    pub fn set_checks_enabled(
        &self,
        monitor_id: &str,
        enabled: bool,
    ) -> Result<(), SchedulerError> {
        {
            let mut monitors = self.lock_monitors();
            let entry = monitors
                .get_mut(monitor_id)
                .ok_or_else(|| SchedulerError::UnknownMonitor(monitor_id.to_string()))?;
            entry.config.checks_enabled = enabled;
        }
        self.store.set_checks_enabled(monitor_id, enabled)?;
        Ok(())
    }

    pub fn set_alerts_enabled(
        &self,
        monitor_id: &str,
        enabled: bool,
    ) -> Result<(), SchedulerError> {
        {
            let mut monitors = self.lock_monitors();
            let entry = monitors
                .get_mut(monitor_id)
                .ok_or_else(|| SchedulerError::UnknownMonitor(monitor_id.to_string()))?;
            entry.config.alerts_enabled = enabled;
        }
        self.store.set_alerts_enabled(monitor_id, enabled)?;
        Ok(())
    }

    pub fn set_interval(&self, monitor_id: &str, interval_secs: u64) -> Result<(), SchedulerError> {
        {
            let mut monitors = self.lock_monitors();
            let entry = monitors
                .get_mut(monitor_id)
                .ok_or_else(|| SchedulerError::UnknownMonitor(monitor_id.to_string()))?;
            entry.config.interval_secs = interval_secs;
            // Shortening an interval takes effect without waiting out the
            // previously scheduled due time.
            let candidate =
                Utc::now() + chrono::Duration::seconds(interval_secs.max(1) as i64);
            if candidate < entry.schedule.next_due {
                entry.schedule.next_due = candidate;
            }
        }
        self.store.set_interval(monitor_id, interval_secs)?;
        Ok(())
    }

    pub fn set_threshold(&self, monitor_id: &str, threshold: u32) -> Result<(), SchedulerError> {
        {
            let mut monitors = self.lock_monitors();
            let entry = monitors
                .get_mut(monitor_id)
                .ok_or_else(|| SchedulerError::UnknownMonitor(monitor_id.to_string()))?;
            entry.config.threshold = threshold;
        }
        self.store.set_threshold(monitor_id, threshold)?;
        Ok(())
    }

    /// Force a check as soon as the next scheduling pass runs.
    pub fn check_now(&self, monitor_id: &str) -> Result<(), SchedulerError> {
        let mut monitors = self.lock_monitors();
        let entry = monitors
            .get_mut(monitor_id)
            .ok_or_else(|| SchedulerError::UnknownMonitor(monitor_id.to_string()))?;
        if !entry.schedule.running {
            entry.schedule.next_due = Utc::now();
        }
        Ok(())
    }

    // ---- monitor definitions ----

    pub fn create_definition(&self, def: MonitorDef) -> Result<(), SchedulerError> {
        self.store.insert_monitor_def(&def)?;
        tracing::info!(def_id = %def.id, name = %def.name, "Created monitor definition");
        self.lock_defs().insert(def.id.clone(), Arc::new(def));
        Ok(())
    }

    /// Update a definition and re-expand the cached command lines of every
    /// monitor using it. A monitor whose arguments no longer resolve moves
    /// to the excluded set; one that starts resolving again moves back.
    pub fn update_definition(&self, def: MonitorDef) -> Result<(), SchedulerError> {
        if !self.lock_defs().contains_key(&def.id) {
            return Err(SchedulerError::UnknownDefinition(def.id.clone()));
        }
        self.store.update_monitor_def(&def)?;
        self.refresh_definition(Arc::new(def))?;
        Ok(())
    }

    pub fn set_definition_arg(
        &self,
        def_id: &str,
        arg: upmon_common::types::ArgSpec,
    ) -> Result<(), SchedulerError> {
        let mut def = self
            .lock_defs()
            .get(def_id)
            .map(|d| d.as_ref().clone())
            .ok_or_else(|| SchedulerError::UnknownDefinition(def_id.to_string()))?;
        self.store.set_def_arg(def_id, &arg)?;
        match def.arg_specs.iter_mut().find(|a| a.name == arg.name) {
            Some(existing) => *existing = arg,
            None => def.arg_specs.push(arg),
        }
        self.refresh_definition(Arc::new(def))?;
        Ok(())
    }

    pub fn delete_definition_arg(&self, def_id: &str, name: &str) -> Result<(), SchedulerError> {
        let mut def = self
            .lock_defs()
            .get(def_id)
            .map(|d| d.as_ref().clone())
            .ok_or_else(|| SchedulerError::UnknownDefinition(def_id.to_string()))?;
        self.store.delete_def_arg(def_id, name)?;
        def.arg_specs.retain(|a| a.name != name);
        self.refresh_definition(Arc::new(def))?;
        Ok(())
    }

    /// A definition with monitors attached cannot be deleted.
    pub fn delete_definition(&self, def_id: &str) -> Result<(), SchedulerError> {
        let in_use = self
            .lock_monitors()
            .values()
            .any(|entry| entry.config.def_id == def_id);
        if in_use {
            return Err(SchedulerError::DefinitionInUse(def_id.to_string()));
        }
        if self.lock_defs().remove(def_id).is_none() {
            return Err(SchedulerError::UnknownDefinition(def_id.to_string()));
        }
        self.store.delete_monitor_def(def_id)?;
        tracing::info!(def_id = %def_id, "Deleted monitor definition");
        Ok(())
    }

    fn refresh_definition(&self, def: Arc<MonitorDef>) -> Result<(), SchedulerError> {
        self.lock_defs().insert(def.id.clone(), def.clone());

        // Re-expand live monitors; failures move them to the excluded set.
        let mut newly_invalid = Vec::new();
        {
            let mut monitors = self.lock_monitors();
            for (id, entry) in monitors.iter_mut() {
                if entry.config.def_id != def.id {
                    continue;
                }
                entry.def = def.clone();
                match args::expand_cmdline(
                    &def.cmdline_args_tmpl,
                    &def.arg_specs,
                    &entry.config.args,
                ) {
                    Ok(expanded) => {
                        entry.expanded_args = expanded;
                        entry.description = args::render_description(
                            &def.description_tmpl,
                            &def.arg_specs,
                            &entry.config.args,
                        );
                    }
                    Err(e) => {
                        tracing::error!(
                            monitor_id = %id,
                            error = %e,
                            "Monitor arguments no longer resolve after definition update"
                        );
                        newly_invalid.push((id.clone(), e.to_string()));
                    }
                }
            }
            for (id, _) in &newly_invalid {
                monitors.remove(id);
            }
        }
        {
            let mut invalid = self.lock_invalid();
            for (id, error) in newly_invalid {
                invalid.insert(id, error);
            }
        }

        // Previously excluded monitors of this definition may resolve now.
        let candidates: Vec<String> = self.lock_invalid().keys().cloned().collect();
        if !candidates.is_empty() {
            let stored = self.store.list_monitors()?;
            for (config, state) in stored {
                if config.def_id != def.id || !candidates.contains(&config.id) {
                    continue;
                }
                let monitor_id = config.id.clone();
                if let Ok(entry) =
                    MonitorEntry::build(config, def.clone(), state, Utc::now())
                {
                    tracing::info!(monitor_id = %monitor_id, "Monitor valid again after definition update");
                    self.lock_monitors().insert(monitor_id.clone(), entry);
                    self.lock_invalid().remove(&monitor_id);
                }
            }
        }
        Ok(())
    }

    // ---- read-side accessors ----

    pub fn definitions(&self) -> Vec<MonitorDef> {
        let mut defs: Vec<MonitorDef> = self
            .lock_defs()
            .values()
            .map(|d| d.as_ref().clone())
            .collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    pub fn definition(&self, def_id: &str) -> Option<MonitorDef> {
        self.lock_defs().get(def_id).map(|d| d.as_ref().clone())
    }

    pub fn snapshots(&self) -> Vec<MonitorSnapshot> {
        let mut snapshots: Vec<MonitorSnapshot> = self
            .lock_monitors()
            .values()
            .map(snapshot_of)
            .collect();
        snapshots.sort_by(|a, b| a.id.cmp(&b.id));
        snapshots
    }

    pub fn snapshot(&self, monitor_id: &str) -> Option<MonitorSnapshot> {
        self.lock_monitors().get(monitor_id).map(snapshot_of)
    }

    pub fn has_monitor(&self, monitor_id: &str) -> bool {
        self.lock_monitors().contains_key(monitor_id)
            || self.lock_invalid().contains_key(monitor_id)
    }

    /// Monitors excluded from scheduling, with their configuration errors.
    pub fn invalid_monitors(&self) -> HashMap<String, String> {
        self.lock_invalid().clone()
    }

    pub fn running_count(&self) -> usize {
        self.lock_monitors()
            .values()
            .filter(|e| e.schedule.running)
            .count()
    }

    pub fn monitor_count(&self) -> usize {
        self.lock_monitors().len()
    }

    pub fn available_permits(&self) -> usize {
        self.gate.available_permits()
    }
}

fn snapshot_of(entry: &MonitorEntry) -> MonitorSnapshot {
    MonitorSnapshot {
        id: entry.config.id.clone(),
        def_id: entry.config.def_id.clone(),
        description: entry.description.clone(),
        interval_secs: entry.config.interval_secs,
        threshold: entry.config.threshold,
        checks_enabled: entry.config.checks_enabled,
        alerts_enabled: entry.config.alerts_enabled,
        args: entry.config.args.clone(),
        metadata: entry.config.metadata.clone(),
        state: entry.state.clone(),
        next_due: entry.schedule.next_due,
        running: entry.schedule.running,
        last_check: entry.schedule.last_check,
    }
}
