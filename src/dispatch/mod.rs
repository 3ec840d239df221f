//! Alert dispatch.
//!
//! Domain processors produce [`AlertEvent`]s; the [`AlertDispatcher`]
//! delivers each one independently through a [`NotificationTransport`].
//! Delivery failures are logged and reported as `false`, never raised.

pub mod smtp;

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use futures::future::join_all;
use serde::Serialize;

use crate::error::{Error, Result};

pub use smtp::SmtpTransport;

/// A composed alert, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertEvent {
    pub subject: String,
    pub body: String,
}

impl AlertEvent {
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
        }
    }
}

/// Result of dispatching one alert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
    pub subject: String,
    pub delivered: bool,
}

/// Trait for notification channels.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Deliver one message to every recipient.
    async fn send(&self, subject: &str, recipients: &[String], body: &str) -> Result<()>;
}

/// Forwards alerts to a transport, one delivery per alert.
pub struct AlertDispatcher {
    transport: Arc<dyn NotificationTransport>,
    recipients: Vec<String>,
    enabled: bool,
}

impl AlertDispatcher {
    /// Create a dispatcher.
    pub fn new(transport: Arc<dyn NotificationTransport>, recipients: Vec<String>, enabled: bool) -> Self {
        Self {
            transport,
            recipients,
            enabled,
        }
    }

    /// A switched-off channel with no transport behind it.
    pub fn disabled() -> Self {
        Self::new(Arc::new(Muted), Vec::new(), false)
    }

    /// Whether the channel is switched on.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Deliver one alert. Returns whether the transport accepted it.
    pub async fn dispatch(&self, subject: &str, body: &str) -> bool {
        if !self.enabled {
            log::info!("Email notifications are disabled, not sending: {}", subject);
            return false;
        }

        let body = stamp(Local::now(), body);
        match self.transport.send(subject, &self.recipients, &body).await {
            Ok(()) => {
                log::info!("Email alert sent: {}", subject);
                true
            }
            Err(e) => {
                log::error!("Failed to send email alert '{}': {}", subject, e);
                false
            }
        }
    }

    /// Deliver a batch of alerts concurrently; outcomes keep input order.
    pub async fn dispatch_all(&self, alerts: &[AlertEvent]) -> Vec<DispatchOutcome> {
        join_all(alerts.iter().map(|alert| async move {
            DispatchOutcome {
                subject: alert.subject.clone(),
                delivered: self.dispatch(&alert.subject, &alert.body).await,
            }
        }))
        .await
    }
}

/// Transport behind a disabled dispatcher.
struct Muted;

#[async_trait]
impl NotificationTransport for Muted {
    async fn send(&self, _subject: &str, _recipients: &[String], _body: &str) -> Result<()> {
        Err(Error::Dispatch("notifications are disabled".to_string()))
    }
}

/// Prefix a body with the alert time line.
fn stamp(at: DateTime<Local>, body: &str) -> String {
    format!("Alert Time: {}\n\n{}", at.format("%Y-%m-%d %H:%M:%S"), body)
}

#[cfg(test)]
pub mod mock {
    use std::sync::Mutex;

    use super::*;
    use crate::error::Error;

    /// Transport that records messages and rejects chosen subjects.
    #[derive(Default)]
    pub struct MockTransport {
        pub sent: Mutex<Vec<(String, Vec<String>, String)>>,
        pub reject: Vec<String>,
    }

    impl MockTransport {
        pub fn rejecting(subjects: &[&str]) -> Self {
            Self {
                sent: Mutex::new(Vec::new()),
                reject: subjects.iter().map(|s| s.to_string()).collect(),
            }
        }

        pub fn subjects(&self) -> Vec<String> {
            self.sent.lock().unwrap().iter().map(|(s, _, _)| s.clone()).collect()
        }
    }

    #[async_trait]
    impl NotificationTransport for MockTransport {
        async fn send(&self, subject: &str, recipients: &[String], body: &str) -> Result<()> {
            if self.reject.iter().any(|r| r == subject) {
                return Err(Error::Dispatch("mailbox unavailable".to_string()));
            }
            self.sent
                .lock()
                .unwrap()
                .push((subject.to_string(), recipients.to_vec(), body.to_string()));
            Ok(())
        }
    }
}
