use crate::NotificationChannel;
use anyhow::Result;
use async_trait::async_trait;
use tracing;
use upmon_common::types::{format_map, AlertEvent, Contact};

pub struct WebhookChannel {
    client: reqwest::Client,
    urls: Vec<String>,
    body_template: Option<String>,
}

impl WebhookChannel {
    pub fn new(urls: Vec<String>, body_template: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            urls,
            body_template,
        }
    }

    pub fn render_body(&self, alert: &AlertEvent, contacts: &[Contact]) -> String {
        if let Some(template) = &self.body_template {
            template
                .replace("{{monitor_id}}", &alert.monitor_id)
                .replace("{{description}}", &alert.monitor_description)
                .replace("{{previous_state}}", &alert.previous_state.to_string())
                .replace("{{new_state}}", &alert.new_state.to_string())
                .replace(
                    "{{previous_duration_secs}}",
                    &alert.previous_state_duration_secs.to_string(),
                )
                .replace("{{message}}", &alert.message)
                .replace("{{metadata}}", &format_map(&alert.metadata))
                .replace("{{timestamp}}", &alert.timestamp.to_rfc3339())
        } else {
            let emails: Vec<&str> = contacts
                .iter()
                .filter_map(|c| c.email.as_deref())
                .collect();
            let phones: Vec<&str> = contacts
                .iter()
                .filter_map(|c| c.phone.as_deref())
                .collect();
            serde_json::json!({
                "alert_id": alert.id,
                "monitor_id": alert.monitor_id,
                "description": alert.monitor_description,
                "previous_state": alert.previous_state.to_string(),
                "new_state": alert.new_state.to_string(),
                "previous_duration_secs": alert.previous_state_duration_secs,
                "message": alert.message,
                "metadata": alert.metadata,
                "arguments": alert.arguments,
                "email_contacts": emails,
                "phone_contacts": phones,
                "timestamp": alert.timestamp.to_rfc3339(),
            })
            .to_string()
        }
    }
}

#[async_trait]
impl NotificationChannel for WebhookChannel {
    async fn send(&self, alert: &AlertEvent, contacts: &[Contact]) -> Result<()> {
        let body = self.render_body(alert, contacts);
        let mut last_err = None;
        let mut failed = 0usize;

        for url in &self.urls {
            let mut sent = false;
            for attempt in 0..3u32 {
                match self
                    .client
                    .post(url.as_str())
                    .header("Content-Type", "application/json")
                    .body(body.clone())
                    .send()
                    .await
                {
                    Ok(resp) if resp.status().is_success() => {
                        sent = true;
                        break;
                    }
                    Ok(resp) => {
                        tracing::warn!(
                            attempt = attempt + 1,
                            status = %resp.status(),
                            "Webhook returned non-success status, retrying"
                        );
                        last_err = Some(anyhow::anyhow!("HTTP {}", resp.status()));
                    }
                    Err(e) => {
                        tracing::warn!(
                            attempt = attempt + 1,
                            error = %e,
                            "Webhook send failed, retrying"
                        );
                        last_err = Some(e.into());
                    }
                }
                if attempt < 2 {
                    tokio::time::sleep(std::time::Duration::from_millis(100 * 2u64.pow(attempt)))
                        .await;
                }
            }
            if !sent {
                failed += 1;
                tracing::error!(url = %url, "Webhook failed after 3 attempts");
            }
        }

        if failed > 0 {
            return Err(last_err
                .unwrap_or_else(|| anyhow::anyhow!("{failed} webhook deliveries failed")));
        }
        Ok(())
    }

    fn channel_name(&self) -> &str {
        "webhook"
    }
}
