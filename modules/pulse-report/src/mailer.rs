//! SMTP dispatch for the Market Pulse digest. Best-effort: the scan loop
//! persists the report whether or not the send succeeds.

use anyhow::{Context, Result};
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{info, warn};

use pulse_common::Config;

pub struct Mailer {
    transport: Option<SmtpTransport>,
    from: String,
    recipients: Vec<String>,
}

impl Mailer {
    /// Build from config. An empty SMTP host or recipient list disables
    /// dispatch — send() becomes a logged no-op.
    pub fn from_config(config: &Config) -> Self {
        let transport = if config.smtp_host.is_empty() || config.recipients.is_empty() {
            warn!("SMTP host or recipients not configured, email dispatch disabled");
            None
        } else {
            match SmtpTransport::relay(&config.smtp_host) {
                Ok(builder) => {
                    let builder = if config.smtp_username.is_empty() {
                        builder
                    } else {
                        builder.credentials(Credentials::new(
                            config.smtp_username.clone(),
                            config.smtp_password.clone(),
                        ))
                    };
                    Some(builder.build())
                }
                Err(e) => {
                    warn!(error = %e, "Invalid SMTP relay host, email dispatch disabled");
                    None
                }
            }
        };

        Self {
            transport,
            from: config.smtp_from.clone(),
            recipients: config.recipients.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.transport.is_some()
    }

    /// Send an HTML email to all configured recipients.
    /// Returns Ok(false) when dispatch is disabled.
    pub fn send(&self, subject: &str, html: &str) -> Result<bool> {
        let Some(transport) = &self.transport else {
            return Ok(false);
        };

        let mut builder = Message::builder()
            .from(self.from.parse().context("Invalid from address")?)
            .subject(subject)
            .header(ContentType::TEXT_HTML);
        for recipient in &self.recipients {
            builder = builder.to(recipient
                .parse()
                .with_context(|| format!("Invalid recipient: {recipient}"))?);
        }

        let message = builder
            .body(html.to_string())
            .context("Failed to build email message")?;

        transport.send(&message).context("SMTP send failed")?;
        info!(
            recipients = self.recipients.len(),
            subject, "Market Pulse email sent"
        );
        Ok(true)
    }
}
