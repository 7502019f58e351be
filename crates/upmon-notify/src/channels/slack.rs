use crate::utils::display_duration;
use crate::NotificationChannel;
use anyhow::Result;
use async_trait::async_trait;
use tracing;
use upmon_common::types::{AlertEvent, Contact};

pub struct SlackChannel {
    client: reqwest::Client,
    webhook_url: String,
}

impl SlackChannel {
    pub fn new(webhook_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            webhook_url: webhook_url.to_string(),
        }
    }

    /// Slack incoming-webhook payload: one attachment per alert with the
    /// previous-state duration as a field.
    pub fn build_payload(alert: &AlertEvent) -> serde_json::Value {
        let text = format!(
            "{}: {} -> {} ({})",
            alert.monitor_description, alert.previous_state, alert.new_state, alert.message
        );
        serde_json::json!({
            "attachments": [{
                "fallback": text,
                "pretext": text,
                "color": match alert.new_state.to_string().as_str() {
                    "up" => "good",
                    "down" => "danger",
                    _ => "warning",
                },
                "fields": [{
                    "title": "Duration",
                    "value": format!(
                        "was {} for {}",
                        alert.previous_state,
                        display_duration(alert.previous_state_duration_secs)
                    ),
                    "short": false,
                }],
            }]
        })
    }
}

#[async_trait]
impl NotificationChannel for SlackChannel {
    async fn send(&self, alert: &AlertEvent, _contacts: &[Contact]) -> Result<()> {
        let payload = Self::build_payload(alert);
        let resp = self
            .client
            .post(&self.webhook_url)
            .json(&payload)
            .send()
            .await?;
        if !resp.status().is_success() {
            tracing::warn!(status = %resp.status(), "Slack webhook returned non-success status");
            return Err(anyhow::anyhow!("slack webhook HTTP {}", resp.status()));
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "slack"
    }
}
