use crate::error::{Result, StorageError};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use upmon_common::types::{ArgSpec, Contact, MonitorConfig, MonitorDef, MonitorState, StateRecord};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS monitor_defs (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    active INTEGER NOT NULL DEFAULT 1,
    cmdline_filename TEXT NOT NULL,
    cmdline_args_tmpl TEXT NOT NULL,
    description_tmpl TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS monitor_def_args (
    id TEXT PRIMARY KEY,
    def_id TEXT NOT NULL,
    name TEXT NOT NULL,
    display_name TEXT NOT NULL DEFAULT '',
    description TEXT NOT NULL DEFAULT '',
    required INTEGER NOT NULL DEFAULT 0,
    default_value TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_def_args_def ON monitor_def_args(def_id);
CREATE TABLE IF NOT EXISTS monitors (
    id TEXT PRIMARY KEY,
    def_id TEXT NOT NULL,
    interval_secs INTEGER NOT NULL,
    threshold INTEGER NOT NULL,
    checks_enabled INTEGER NOT NULL DEFAULT 1,
    alerts_enabled INTEGER NOT NULL DEFAULT 1,
    metadata TEXT NOT NULL DEFAULT '{}',
    announced_state TEXT NOT NULL DEFAULT 'unknown',
    candidate_state TEXT NOT NULL DEFAULT 'unknown',
    consecutive INTEGER NOT NULL DEFAULT 1,
    state_since INTEGER NOT NULL,
    last_message TEXT NOT NULL DEFAULT '',
    deleted INTEGER NOT NULL DEFAULT 0,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS monitor_args (
    monitor_id TEXT NOT NULL,
    name TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (monitor_id, name)
);
CREATE TABLE IF NOT EXISTS contacts (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    email TEXT,
    phone TEXT,
    active INTEGER NOT NULL DEFAULT 1,
    created_at INTEGER NOT NULL,
    updated_at INTEGER NOT NULL
);
CREATE TABLE IF NOT EXISTS monitor_contacts (
    monitor_id TEXT NOT NULL,
    contact_id TEXT NOT NULL,
    PRIMARY KEY (monitor_id, contact_id)
);
CREATE TABLE IF NOT EXISTS monitor_alerts (
    id TEXT PRIMARY KEY,
    monitor_id TEXT NOT NULL,
    start_ts INTEGER NOT NULL,
    end_ts INTEGER,
    message TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS idx_monitor_alerts_monitor
    ON monitor_alerts(monitor_id, start_ts);
";

/// One row of alert history: an open row per confirmed DOWN period,
/// closed when the monitor recovers.
#[derive(Debug, Clone, Serialize)]
pub struct MonitorAlertRow {
    pub id: String,
    pub monitor_id: String,
    pub start_ts: DateTime<Utc>,
    pub end_ts: Option<DateTime<Utc>>,
    pub message: String,
}

/// Unified access layer for the monitoring database.
pub struct MonitorStore {
    conn: Mutex<Connection>,
}

impl MonitorStore {
    /// Open (and initialize) the database at `path`.
    ///
    /// Monitors marked deleted while a check was in flight during a
    /// previous run are purged here.
    pub fn new(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| StorageError::Other(format!("failed to create data dir: {e}")))?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL;")?;
        conn.execute_batch(SCHEMA)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        let purged = store.purge_deleted()?;
        if purged > 0 {
            tracing::info!(purged, "Purged monitors marked deleted in a previous run");
        }
        Ok(store)
    }

    /// Lock the connection, recovering from a poisoned Mutex if necessary.
    fn lock_conn(&self) -> MutexGuard<'_, Connection> {
        self.conn
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // ---- monitor definitions ----

    pub fn insert_monitor_def(&self, def: &MonitorDef) -> Result<()> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO monitor_defs
                 (id, name, active, cmdline_filename, cmdline_args_tmpl, description_tmpl,
                  created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            rusqlite::params![
                &def.id,
                &def.name,
                def.active,
                &def.cmdline_filename,
                &def.cmdline_args_tmpl,
                &def.description_tmpl,
                def.created_at.timestamp_millis(),
                def.updated_at.timestamp_millis(),
            ],
        )?;
        for arg in &def.arg_specs {
            tx.execute(
                "INSERT INTO monitor_def_args
                     (id, def_id, name, display_name, description, required, default_value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    &arg.id,
                    &def.id,
                    &arg.name,
                    &arg.display_name,
                    &arg.description,
                    arg.required,
                    &arg.default_value,
                ],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    pub fn update_monitor_def(&self, def: &MonitorDef) -> Result<()> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE monitor_defs
                 SET name = ?2, active = ?3, cmdline_filename = ?4,
                     cmdline_args_tmpl = ?5, description_tmpl = ?6, updated_at = ?7
             WHERE id = ?1",
            rusqlite::params![
                &def.id,
                &def.name,
                def.active,
                &def.cmdline_filename,
                &def.cmdline_args_tmpl,
                &def.description_tmpl,
                Utc::now().timestamp_millis(),
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound {
                entity: "monitor_def",
                id: def.id.clone(),
            });
        }
        Ok(())
    }

    pub fn delete_monitor_def(&self, def_id: &str) -> Result<bool> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM monitor_defs WHERE id = ?1", [def_id])?;
        tx.execute("DELETE FROM monitor_def_args WHERE def_id = ?1", [def_id])?;
        tx.commit()?;
        Ok(removed > 0)
    }

    /// Insert or replace a definition argument by (def_id, name).
    pub fn set_def_arg(&self, def_id: &str, arg: &ArgSpec) -> Result<()> {
        let conn = self.lock_conn();
        let updated = conn.execute(
            "UPDATE monitor_def_args
                 SET display_name = ?3, description = ?4, required = ?5, default_value = ?6
             WHERE def_id = ?1 AND name = ?2",
            rusqlite::params![
                def_id,
                &arg.name,
                &arg.display_name,
                &arg.description,
                arg.required,
                &arg.default_value,
            ],
        )?;
        if updated == 0 {
            conn.execute(
                "INSERT INTO monitor_def_args
                     (id, def_id, name, display_name, description, required, default_value)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    &arg.id,
                    def_id,
                    &arg.name,
                    &arg.display_name,
                    &arg.description,
                    arg.required,
                    &arg.default_value,
                ],
            )?;
        }
        Ok(())
    }

    pub fn delete_def_arg(&self, def_id: &str, name: &str) -> Result<bool> {
        let conn = self.lock_conn();
        let removed = conn.execute(
            "DELETE FROM monitor_def_args WHERE def_id = ?1 AND name = ?2",
            [def_id, name],
        )?;
        Ok(removed > 0)
    }

    pub fn list_monitor_defs(&self) -> Result<Vec<MonitorDef>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, active, cmdline_filename, cmdline_args_tmpl, description_tmpl,
                    created_at, updated_at
             FROM monitor_defs ORDER BY created_at ASC",
        )?;
        let mut defs: Vec<MonitorDef> = stmt
            .query_map([], |row| {
                Ok(MonitorDef {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    active: row.get(2)?,
                    cmdline_filename: row.get(3)?,
                    cmdline_args_tmpl: row.get(4)?,
                    description_tmpl: row.get(5)?,
                    arg_specs: Vec::new(),
                    created_at: ts_from_millis(row.get(6)?),
                    updated_at: ts_from_millis(row.get(7)?),
                })
            })?
            .collect::<std::result::Result<_, _>>()?;

        let mut args_by_def: HashMap<String, Vec<ArgSpec>> = HashMap::new();
        let mut stmt = conn.prepare_cached(
            "SELECT id, def_id, name, display_name, description, required, default_value
             FROM monitor_def_args ORDER BY name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let def_id: String = row.get(1)?;
            Ok((
                def_id,
                ArgSpec {
                    id: row.get(0)?,
                    name: row.get(2)?,
                    display_name: row.get(3)?,
                    description: row.get(4)?,
                    required: row.get(5)?,
                    default_value: row.get(6)?,
                },
            ))
        })?;
        for row in rows {
            let (def_id, arg) = row?;
            args_by_def.entry(def_id).or_default().push(arg);
        }
        for def in &mut defs {
            if let Some(args) = args_by_def.remove(&def.id) {
                def.arg_specs = args;
            }
        }
        Ok(defs)
    }

    pub fn get_monitor_def(&self, def_id: &str) -> Result<Option<MonitorDef>> {
        Ok(self
            .list_monitor_defs()?
            .into_iter()
            .find(|d| d.id == def_id))
    }

    // ---- monitors ----

    pub fn insert_monitor(&self, config: &MonitorConfig, state: &StateRecord) -> Result<()> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        tx.execute(
            "INSERT INTO monitors
                 (id, def_id, interval_secs, threshold, checks_enabled, alerts_enabled,
                  metadata, announced_state, candidate_state, consecutive, state_since,
                  last_message, deleted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, 0, ?13, ?14)",
            rusqlite::params![
                &config.id,
                &config.def_id,
                config.interval_secs as i64,
                config.threshold,
                config.checks_enabled,
                config.alerts_enabled,
                serde_json::to_string(&config.metadata)?,
                state.announced.to_string(),
                state.candidate.to_string(),
                state.consecutive,
                state.state_since.timestamp_millis(),
                &state.last_message,
                config.created_at.timestamp_millis(),
                config.updated_at.timestamp_millis(),
            ],
        )?;
        for (name, value) in &config.args {
            tx.execute(
                "INSERT INTO monitor_args (monitor_id, name, value) VALUES (?1, ?2, ?3)",
                rusqlite::params![&config.id, name, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    /// Load all non-deleted monitors together with their persisted state.
    pub fn list_monitors(&self) -> Result<Vec<(MonitorConfig, StateRecord)>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare_cached(
            "SELECT id, def_id, interval_secs, threshold, checks_enabled, alerts_enabled,
                    metadata, announced_state, candidate_state, consecutive, state_since,
                    last_message, created_at, updated_at
             FROM monitors WHERE deleted = 0 ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            let metadata: String = row.get(6)?;
            let announced: String = row.get(7)?;
            let candidate: String = row.get(8)?;
            Ok((
                MonitorConfig {
                    id: row.get(0)?,
                    def_id: row.get(1)?,
                    interval_secs: row.get::<_, i64>(2)? as u64,
                    threshold: row.get(3)?,
                    checks_enabled: row.get(4)?,
                    alerts_enabled: row.get(5)?,
                    args: HashMap::new(),
                    metadata: HashMap::new(),
                    created_at: ts_from_millis(row.get(12)?),
                    updated_at: ts_from_millis(row.get(13)?),
                },
                metadata,
                announced,
                candidate,
                row.get::<_, u32>(9)?,
                row.get::<_, i64>(10)?,
                row.get::<_, String>(11)?,
            ))
        })?;

        let mut monitors = Vec::new();
        for row in rows {
            let (mut config, metadata, announced, candidate, consecutive, state_since, last_message) =
                row?;
            config.metadata = serde_json::from_str(&metadata)?;
            let state = StateRecord {
                announced: parse_state("announced_state", &announced)?,
                candidate: parse_state("candidate_state", &candidate)?,
                consecutive,
                state_since: ts_from_millis(state_since),
                last_message,
            };
            monitors.push((config, state));
        }

        let mut stmt =
            conn.prepare_cached("SELECT monitor_id, name, value FROM monitor_args")?;
        let mut args_by_monitor: HashMap<String, HashMap<String, String>> = HashMap::new();
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        for row in rows {
            let (monitor_id, name, value) = row?;
            args_by_monitor
                .entry(monitor_id)
                .or_default()
                .insert(name, value);
        }
        for (config, _) in &mut monitors {
            if let Some(args) = args_by_monitor.remove(&config.id) {
                config.args = args;
            }
        }
        Ok(monitors)
    }

    pub fn update_monitor_args(
        &self,
        monitor_id: &str,
        args: &HashMap<String, String>,
    ) -> Result<()> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM monitor_args WHERE monitor_id = ?1", [monitor_id])?;
        for (name, value) in args {
            tx.execute(
                "INSERT INTO monitor_args (monitor_id, name, value) VALUES (?1, ?2, ?3)",
                rusqlite::params![monitor_id, name, value],
            )?;
        }
        touch_monitor(&tx, monitor_id)?;
        tx.commit()?;
        Ok(())
    }

    pub fn set_checks_enabled(&self, monitor_id: &str, enabled: bool) -> Result<()> {
        self.update_monitor_column(monitor_id, "checks_enabled", enabled)
    }

    pub fn set_alerts_enabled(&self, monitor_id: &str, enabled: bool) -> Result<()> {
        self.update_monitor_column(monitor_id, "alerts_enabled", enabled)
    }

    pub fn set_interval(&self, monitor_id: &str, interval_secs: u64) -> Result<()> {
        self.update_monitor_column(monitor_id, "interval_secs", interval_secs as i64)
    }

    pub fn set_threshold(&self, monitor_id: &str, threshold: u32) -> Result<()> {
        self.update_monitor_column(monitor_id, "threshold", threshold)
    }

    fn update_monitor_column<V: rusqlite::ToSql>(
        &self,
        monitor_id: &str,
        column: &str,
        value: V,
    ) -> Result<()> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            &format!("UPDATE monitors SET {column} = ?2, updated_at = ?3 WHERE id = ?1"),
            rusqlite::params![monitor_id, value, Utc::now().timestamp_millis()],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound {
                entity: "monitor",
                id: monitor_id.to_string(),
            });
        }
        Ok(())
    }

    /// Persist the per-monitor state record after a completed check.
    pub fn save_state(&self, monitor_id: &str, state: &StateRecord) -> Result<()> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE monitors
                 SET announced_state = ?2, candidate_state = ?3, consecutive = ?4,
                     state_since = ?5, last_message = ?6
             WHERE id = ?1",
            rusqlite::params![
                monitor_id,
                state.announced.to_string(),
                state.candidate.to_string(),
                state.consecutive,
                state.state_since.timestamp_millis(),
                &state.last_message,
            ],
        )?;
        if changed == 0 {
            return Err(StorageError::NotFound {
                entity: "monitor",
                id: monitor_id.to_string(),
            });
        }
        Ok(())
    }

    pub fn mark_monitor_deleted(&self, monitor_id: &str) -> Result<()> {
        self.update_monitor_column(monitor_id, "deleted", true)
    }

    /// Remove all traces of a monitor from the database.
    pub fn purge_monitor(&self, monitor_id: &str) -> Result<()> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        tx.execute("DELETE FROM monitors WHERE id = ?1", [monitor_id])?;
        tx.execute("DELETE FROM monitor_args WHERE monitor_id = ?1", [monitor_id])?;
        tx.execute(
            "DELETE FROM monitor_contacts WHERE monitor_id = ?1",
            [monitor_id],
        )?;
        tx.execute(
            "DELETE FROM monitor_alerts WHERE monitor_id = ?1",
            [monitor_id],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn purge_deleted(&self) -> Result<u32> {
        let ids: Vec<String> = {
            let conn = self.lock_conn();
            let mut stmt = conn.prepare("SELECT id FROM monitors WHERE deleted = 1")?;
            let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;
            rows.collect::<std::result::Result<_, _>>()?
        };
        for id in &ids {
            self.purge_monitor(id)?;
        }
        Ok(ids.len() as u32)
    }

    // ---- alert history ----

    /// Record the start of a confirmed DOWN period.
    pub fn open_alert(
        &self,
        alert_id: &str,
        monitor_id: &str,
        start_ts: DateTime<Utc>,
        message: &str,
    ) -> Result<()> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO monitor_alerts (id, monitor_id, start_ts, end_ts, message)
             VALUES (?1, ?2, ?3, NULL, ?4)",
            rusqlite::params![alert_id, monitor_id, start_ts.timestamp_millis(), message],
        )?;
        Ok(())
    }

    /// Close any open alert rows for the monitor. Returns how many closed.
    pub fn close_open_alerts(&self, monitor_id: &str, end_ts: DateTime<Utc>) -> Result<u32> {
        let conn = self.lock_conn();
        let changed = conn.execute(
            "UPDATE monitor_alerts SET end_ts = ?2 WHERE monitor_id = ?1 AND end_ts IS NULL",
            rusqlite::params![monitor_id, end_ts.timestamp_millis()],
        )?;
        Ok(changed as u32)
    }

    pub fn list_alerts(
        &self,
        monitor_id: Option<&str>,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<MonitorAlertRow>> {
        let conn = self.lock_conn();
        let map_row = |row: &rusqlite::Row<'_>| {
            Ok(MonitorAlertRow {
                id: row.get(0)?,
                monitor_id: row.get(1)?,
                start_ts: ts_from_millis(row.get(2)?),
                end_ts: row.get::<_, Option<i64>>(3)?.map(ts_from_millis),
                message: row.get(4)?,
            })
        };
        let rows = match monitor_id {
            Some(id) => {
                let mut stmt = conn.prepare_cached(
                    "SELECT id, monitor_id, start_ts, end_ts, message FROM monitor_alerts
                     WHERE monitor_id = ?1 ORDER BY start_ts DESC LIMIT ?2 OFFSET ?3",
                )?;
                let rows = stmt.query_map(
                    rusqlite::params![id, limit as i64, offset as i64],
                    map_row,
                )?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
            None => {
                let mut stmt = conn.prepare_cached(
                    "SELECT id, monitor_id, start_ts, end_ts, message FROM monitor_alerts
                     ORDER BY start_ts DESC LIMIT ?1 OFFSET ?2",
                )?;
                let rows =
                    stmt.query_map(rusqlite::params![limit as i64, offset as i64], map_row)?;
                rows.collect::<std::result::Result<Vec<_>, _>>()?
            }
        };
        Ok(rows)
    }

    // ---- contacts ----

    pub fn insert_contact(&self, contact: &Contact) -> Result<()> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT INTO contacts (id, name, email, phone, active, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            rusqlite::params![
                &contact.id,
                &contact.name,
                &contact.email,
                &contact.phone,
                contact.active,
                contact.created_at.timestamp_millis(),
                contact.updated_at.timestamp_millis(),
            ],
        )?;
        Ok(())
    }

    pub fn list_contacts(&self) -> Result<Vec<Contact>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare_cached(
            "SELECT id, name, email, phone, active, created_at, updated_at
             FROM contacts ORDER BY created_at ASC",
        )?;
        let rows = stmt.query_map([], contact_from_row)?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }

    pub fn delete_contact(&self, contact_id: &str) -> Result<bool> {
        let mut conn = self.lock_conn();
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM contacts WHERE id = ?1", [contact_id])?;
        tx.execute(
            "DELETE FROM monitor_contacts WHERE contact_id = ?1",
            [contact_id],
        )?;
        tx.commit()?;
        Ok(removed > 0)
    }

    pub fn attach_contact(&self, monitor_id: &str, contact_id: &str) -> Result<()> {
        let conn = self.lock_conn();
        conn.execute(
            "INSERT OR IGNORE INTO monitor_contacts (monitor_id, contact_id) VALUES (?1, ?2)",
            [monitor_id, contact_id],
        )?;
        Ok(())
    }

    pub fn detach_contact(&self, monitor_id: &str, contact_id: &str) -> Result<bool> {
        let conn = self.lock_conn();
        let removed = conn.execute(
            "DELETE FROM monitor_contacts WHERE monitor_id = ?1 AND contact_id = ?2",
            [monitor_id, contact_id],
        )?;
        Ok(removed > 0)
    }

    /// Active contacts attached to a monitor, for notification delivery.
    pub fn contacts_for_monitor(&self, monitor_id: &str) -> Result<Vec<Contact>> {
        let conn = self.lock_conn();
        let mut stmt = conn.prepare_cached(
            "SELECT c.id, c.name, c.email, c.phone, c.active, c.created_at, c.updated_at
             FROM contacts c
             JOIN monitor_contacts mc ON mc.contact_id = c.id
             WHERE mc.monitor_id = ?1 AND c.active = 1
             ORDER BY c.name ASC",
        )?;
        let rows = stmt.query_map([monitor_id], contact_from_row)?;
        Ok(rows.collect::<std::result::Result<_, _>>()?)
    }
}

fn contact_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Contact> {
    Ok(Contact {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        active: row.get(4)?,
        created_at: ts_from_millis(row.get(5)?),
        updated_at: ts_from_millis(row.get(6)?),
    })
}

fn touch_monitor(conn: &Connection, monitor_id: &str) -> rusqlite::Result<()> {
    conn.execute(
        "UPDATE monitors SET updated_at = ?2 WHERE id = ?1",
        rusqlite::params![monitor_id, Utc::now().timestamp_millis()],
    )?;
    Ok(())
}

fn ts_from_millis(millis: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(millis).unwrap_or_default()
}

fn parse_state(column: &'static str, value: &str) -> Result<MonitorState> {
    value
        .parse()
        .map_err(|_| StorageError::InvalidColumnValue {
            column,
            value: value.to_string(),
        })
}
