//! Persistence layer for monitor definitions, monitors, contacts, alert
//! history, and per-monitor state.
//!
//! A single SQLite database with WAL mode holds everything; the schema is
//! created in code at open time. State records are written on every
//! confirmed change so announced states, state-change timestamps, and
//! consecutive counts survive process restarts.

pub mod error;
pub mod store;


pub use error::{Result, StorageError};
pub use store::{MonitorAlertRow, MonitorStore};
