//! Domain processors for the three telemetry streams.
//!
//! Each processor turns records into [`ProcessedEntry`]s (one per record it
//! keeps) and, where the record warrants it, [`AlertEvent`]s. Assessments
//! may run concurrently up to a bound, but output always follows input order.

pub mod health;
pub mod reminders;
pub mod safety;

use std::fmt;
use std::future::Future;

use futures::stream::{self, StreamExt};
use serde::Serialize;

use crate::dispatch::AlertEvent;
use crate::record::Record;

pub use health::{HEALTH_ALERT_SUBJECT, process_health};
pub use reminders::process_reminders;
pub use safety::{FALL_ALERT_SUBJECT, FALL_MARKER, process_safety};

/// One processed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessedEntry {
    pub timestamp: String,
    pub message: String,
}

impl ProcessedEntry {
    pub fn new(timestamp: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            message: message.into(),
        }
    }

    /// `"{timestamp}: {message}"`.
    pub fn rendered(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ProcessedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.timestamp, self.message)
    }
}

/// Everything one processor produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOutput {
    pub entries: Vec<ProcessedEntry>,
    pub alerts: Vec<AlertEvent>,
}

impl StreamOutput {
    /// Rendered entries.
    pub fn rendered(&self) -> Vec<String> {
        self.entries.iter().map(ProcessedEntry::rendered).collect()
    }
}

impl FromIterator<(ProcessedEntry, Option<AlertEvent>)> for StreamOutput {
    fn from_iter<I: IntoIterator<Item = (ProcessedEntry, Option<AlertEvent>)>>(iter: I) -> Self {
        let mut output = StreamOutput::default();
        for (entry, alert) in iter {
            output.entries.push(entry);
            output.alerts.extend(alert);
        }
        output
    }
}

/// Run `f` over records with at most `concurrency` in flight, keeping order.
async fn in_order<'a, I, T, F, Fut>(records: I, concurrency: usize, f: F) -> Vec<T>
where
    I: IntoIterator<Item = &'a Record>,
    F: FnMut(&'a Record) -> Fut,
    Fut: Future<Output = T>,
{
    stream::iter(records).map(f).buffered(concurrency.max(1)).collect().await
}
