//! Typed event fan-out for observability consumers.
//!
//! The scheduler publishes three categories of events: a monitor was
//! queued, a check finished (every check, alerting or not), and a
//! confirmed state change. Delivery uses a broadcast channel: subscribers
//! that fall behind lag and lose the oldest events instead of ever
//! blocking publication, so a slow websocket client cannot slow the
//! scheduling loop.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use upmon_common::types::{AlertEvent, CheckResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventCategory {
    Scheduled,
    CheckFinished,
    StateChange,
}

impl std::fmt::Display for EventCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EventCategory::Scheduled => write!(f, "scheduled"),
            EventCategory::CheckFinished => write!(f, "check_finished"),
            EventCategory::StateChange => write!(f, "state_change"),
        }
    }
}

impl std::str::FromStr for EventCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "scheduled" => Ok(EventCategory::Scheduled),
            "check_finished" => Ok(EventCategory::CheckFinished),
            "state_change" => Ok(EventCategory::StateChange),
            _ => Err(format!("unknown event category: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum MonitorEvent {
    Scheduled {
        monitor_id: String,
        interval_secs: u64,
        timestamp: DateTime<Utc>,
    },
    CheckFinished {
        monitor_id: String,
        result: CheckResult,
    },
    StateChange {
        monitor_id: String,
        alert: AlertEvent,
    },
}

impl MonitorEvent {
    pub fn category(&self) -> EventCategory {
        match self {
            MonitorEvent::Scheduled { .. } => EventCategory::Scheduled,
            MonitorEvent::CheckFinished { .. } => EventCategory::CheckFinished,
            MonitorEvent::StateChange { .. } => EventCategory::StateChange,
        }
    }

    pub fn monitor_id(&self) -> &str {
        match self {
            MonitorEvent::Scheduled { monitor_id, .. }
            | MonitorEvent::CheckFinished { monitor_id, .. }
            | MonitorEvent::StateChange { monitor_id, .. } => monitor_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct EventBroker {
    tx: broadcast::Sender<MonitorEvent>,
}

impl EventBroker {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Publish an event to all current subscribers. Sending fails only
    /// when nobody is subscribed, which is not an error.
    pub fn publish(&self, event: MonitorEvent) {
        let _ = self.tx.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<MonitorEvent> {
        self.tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
