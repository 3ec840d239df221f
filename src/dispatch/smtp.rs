//! SMTP email transport.

use async_trait::async_trait;
use lettre::message::Mailbox;
use lettre::message::header::ContentType;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use super::NotificationTransport;
use crate::config::NotificationSettings;
use crate::error::{Error, Result};

/// Sends alerts as plain-text email through a STARTTLS relay.
pub struct SmtpTransport {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    sender: Option<Mailbox>,
}

impl SmtpTransport {
    /// Create a transport from notification settings.
    ///
    /// No connection is made here, but the connection pool is started on
    /// the current tokio runtime, so this must be called inside one. A
    /// missing sender only fails at send time.
    pub fn new(settings: &NotificationSettings) -> Result<Self> {
        let sender = settings
            .sender
            .as_deref()
            .map(|s| {
                s.parse::<Mailbox>()
                    .map_err(|e| Error::Config(format!("invalid sender address '{}': {}", s, e)))
            })
            .transpose()?;

        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.smtp_server)
            .map_err(|e| Error::Config(format!("invalid SMTP relay '{}': {}", settings.smtp_server, e)))?
            .port(settings.smtp_port);
        if let (Some(user), Some(password)) = (&settings.sender, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), password.clone()));
        }

        Ok(Self {
            mailer: builder.build(),
            sender,
        })
    }

    fn compose(&self, subject: &str, recipients: &[String], body: &str) -> Result<Message> {
        let sender = self
            .sender
            .clone()
            .ok_or_else(|| Error::Dispatch("EMAIL_SENDER not set".to_string()))?;
        if recipients.is_empty() {
            return Err(Error::Dispatch("no recipients configured".to_string()));
        }

        let mut builder = Message::builder()
            .from(sender)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN);
        for recipient in recipients {
            let to = recipient
                .parse::<Mailbox>()
                .map_err(|e| Error::Dispatch(format!("invalid recipient '{}': {}", recipient, e)))?;
            builder = builder.to(to);
        }

        builder
            .body(body.to_string())
            .map_err(|e| Error::Dispatch(format!("failed to build message: {}", e)))
    }
}

#[async_trait]
impl NotificationTransport for SmtpTransport {
    async fn send(&self, subject: &str, recipients: &[String], body: &str) -> Result<()> {
        let message = self.compose(subject, recipients, body)?;
        self.mailer
            .send(message)
            .await
            .map_err(|e| Error::Dispatch(e.to_string()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(sender: Option<&str>) -> NotificationSettings {
        NotificationSettings {
            sender: sender.map(String::from),
            password: Some("app-password".to_string()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_compose_message() {
        let transport = SmtpTransport::new(&settings(Some("care@example.com"))).unwrap();
        let recipients = vec!["a@example.com".to_string(), "b@example.com".to_string()];

        let message = transport.compose("Test Email", &recipients, "This is a test email.").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Subject: Test Email"));
        assert!(raw.contains("a@example.com"));
        assert!(raw.contains("b@example.com"));
        assert!(raw.contains("This is a test email."));
    }

    #[tokio::test]
    async fn test_compose_requires_sender_and_recipients() {
        let transport = SmtpTransport::new(&settings(None)).unwrap();
        let err = transport
            .compose("s", &["a@example.com".to_string()], "b")
            .unwrap_err();
        assert!(matches!(err, Error::Dispatch(_)));

        let transport = SmtpTransport::new(&settings(Some("care@example.com"))).unwrap();
        assert!(transport.compose("s", &[], "b").is_err());
        assert!(transport.compose("s", &["not an address".to_string()], "b").is_err());
    }

    #[tokio::test]
    async fn test_invalid_sender_is_config_error() {
        assert!(matches!(
            SmtpTransport::new(&settings(Some("nope"))),
            Err(Error::Config(_))
        ));
    }
}
