use crate::utils::display_duration;
use crate::NotificationChannel;
use anyhow::Result;
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing;
use upmon_common::types::{format_map, AlertEvent, Contact};

pub struct EmailChannel {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
}

impl EmailChannel {
    pub fn new(
        smtp_host: &str,
        smtp_port: u16,
        username: Option<&str>,
        password: Option<&str>,
        from: &str,
    ) -> Result<Self> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::relay(smtp_host)?.port(smtp_port);

        if let (Some(user), Some(pass)) = (username, password) {
            builder = builder.credentials(Credentials::new(user.to_string(), pass.to_string()));
        }

        let transport = builder.build();
        Ok(Self {
            transport,
            from: from.to_string(),
        })
    }

    pub fn format_subject(alert: &AlertEvent) -> String {
        format!(
            "[upmon] {} is {}",
            alert.monitor_description, alert.new_state
        )
    }

    pub fn format_body(alert: &AlertEvent) -> String {
        let metadata_str = format_map(&alert.metadata);
        let metadata_line = if metadata_str.is_empty() {
            String::new()
        } else {
            format!("\nMetadata: {metadata_str}")
        };
        format!(
            "Monitor: {description}\nState: {prev} -> {new}\nWas {prev} for: {elapsed}\nMessage: {message}{metadata_line}\nTime: {time}",
            description = alert.monitor_description,
            prev = alert.previous_state,
            new = alert.new_state,
            elapsed = display_duration(alert.previous_state_duration_secs),
            message = alert.message,
            metadata_line = metadata_line,
            time = alert.timestamp,
        )
    }
}

#[async_trait]
impl NotificationChannel for EmailChannel {
    async fn send(&self, alert: &AlertEvent, contacts: &[Contact]) -> Result<()> {
        let recipients: Vec<&str> = contacts
            .iter()
            .filter_map(|c| c.email.as_deref())
            .collect();
        if recipients.is_empty() {
            tracing::debug!(
                monitor_id = %alert.monitor_id,
                "No email recipients for monitor, skipping email notification"
            );
            return Ok(());
        }

        let subject = Self::format_subject(alert);
        let body = Self::format_body(alert);
        let mut last_err = None;

        for recipient in recipients {
            let email = Message::builder()
                .from(self.from.parse()?)
                .to(recipient.parse()?)
                .subject(&subject)
                .header(ContentType::TEXT_PLAIN)
                .body(body.clone())?;

            if let Err(e) = self.transport.send(email).await {
                tracing::warn!(recipient = %recipient, error = %e, "Email send failed");
                last_err = Some(e);
            }
        }

        match last_err {
            Some(e) => Err(e.into()),
            None => Ok(()),
        }
    }

    fn channel_name(&self) -> &str {
        "email"
    }
}
