use crate::core::config::EmailConfig;
use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::transport::smtp::client::{Tls, TlsParameters};
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

/// Delivers a transition notification, or fails. Delivery errors must reach the
/// caller; a silently dropped notification defeats the whole point of the watcher.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, subject: &str, body: &str) -> Result<()>;
}

/// SMTP email notifier
pub struct SmtpNotifier {
    config: EmailConfig,
}

impl SmtpNotifier {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn build_message(&self, subject: &str, body: &str) -> Result<Message> {
        Message::builder()
            .from(self.config.from.parse()?)
            .to(self.config.to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .context("Failed to build email message")
    }

    /// Transport is built per send and dropped at the end of the call; the
    /// connection lives only for the one message.
    fn build_transport(&self) -> Result<SmtpTransport> {
        let mut builder = SmtpTransport::builder_dangerous(&self.config.server)
            .port(self.config.port)
            .timeout(Some(self.config.timeout));

        // STARTTLS upgrade happens before any authentication.
        if self.config.tls {
            let params = TlsParameters::new(self.config.server.clone())
                .context("Failed to build TLS parameters")?;
            builder = builder.tls(Tls::Required(params));
        }

        if let Some((user, pass)) = &self.config.credentials {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        Ok(builder.build())
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    async fn notify(&self, subject: &str, body: &str) -> Result<()> {
        info!("Sending notification to {}: {}", self.config.to, subject);

        let email = self.build_message(subject, body)?;
        let mailer = self.build_transport()?;
        mailer.send(&email).context("Failed to send notification")?;

        info!("Notification sent to {}", self.config.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn test_config() -> EmailConfig {
        EmailConfig {
            to: "ops@example.com".to_string(),
            from: "ups@example.com".to_string(),
            server: "smtp.example.com".to_string(),
            port: 587,
            credentials: Some(("user".to_string(), "secret".to_string())),
            tls: true,
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_build_message() {
        let notifier = SmtpNotifier::new(test_config());
        let message = notifier.build_message("UPS status changed to OB", "details");
        assert!(message.is_ok());
    }

    #[test]
    fn test_build_message_rejects_invalid_address() {
        let mut config = test_config();
        config.to = "not an address".to_string();
        let notifier = SmtpNotifier::new(config);
        assert!(notifier.build_message("subject", "body").is_err());
    }

    #[test]
    fn test_build_transport_with_tls_and_credentials() {
        let notifier = SmtpNotifier::new(test_config());
        assert!(notifier.build_transport().is_ok());
    }
}
