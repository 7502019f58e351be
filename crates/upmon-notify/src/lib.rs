//! Notification delivery for confirmed monitor state changes.
//!
//! Alert events are fanned out to every configured
//! [`NotificationChannel`]; built-in channels are email (SMTP), generic
//! webhook, and Slack incoming webhook. Recipient addresses come from the
//! contacts attached to the alerting monitor. Delivery failures are
//! logged per channel and never propagate back into the scheduler.

pub mod channels;
pub mod manager;
pub mod utils;


use anyhow::Result;
use async_trait::async_trait;
use upmon_common::types::{AlertEvent, Contact};

/// A notification delivery channel that sends alert events to an external
/// service (e.g., SMTP, webhook, Slack).
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Delivers the alert event to the given contacts.
    ///
    /// # Errors
    ///
    /// Returns an error if delivery fails after retries (if applicable).
    async fn send(&self, alert: &AlertEvent, contacts: &[Contact]) -> Result<()>;

    /// Returns the channel type name (e.g., `"email"`, `"webhook"`).
    fn channel_name(&self) -> &str;
}
