use crate::NotificationChannel;
use upmon_common::types::{AlertEvent, Contact};

/// Fans one alert event out to every configured channel.
///
/// A failing channel is logged and skipped; notification delivery must
/// never fail or delay the caller.
pub struct NotificationManager {
    channels: Vec<Box<dyn NotificationChannel>>,
}

impl NotificationManager {
    pub fn new(channels: Vec<Box<dyn NotificationChannel>>) -> Self {
        Self { channels }
    }

    pub async fn notify(&self, alert: &AlertEvent, contacts: &[Contact]) {
        if self.channels.is_empty() {
            tracing::debug!(
                monitor_id = %alert.monitor_id,
                "No notification channels configured, alert not delivered"
            );
            return;
        }
        for channel in &self.channels {
            if let Err(e) = channel.send(alert, contacts).await {
                tracing::error!(
                    channel = channel.channel_name(),
                    monitor_id = %alert.monitor_id,
                    error = %e,
                    "Failed to send notification"
                );
            }
        }
    }

    pub fn channels(&self) -> &[Box<dyn NotificationChannel>] {
        &self.channels
    }
}
