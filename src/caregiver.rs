//! Caregiver notification.
//!
//! Derives at most one caregiver message from the full safety and health
//! record sets. Precedence is strict: the first fall the caregiver was told
//! about wins outright; otherwise the abnormal signals of every confirmed,
//! caregiver-notified health record are summarised together.

use crate::persona::Persona;
use crate::record::{HealthRecord, Record, SafetyRecord};
use crate::threshold::{self, HEALTH_RULES};

/// Returned when nothing qualifies.
pub const NO_NOTIFICATIONS: &str = "No recent caregiver notifications.";

/// What the caregiver should hear about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaregiverFinding {
    /// A fall the caregiver was notified of.
    Fall { timestamp: String, location: String },
    /// Abnormal signals across all qualifying health records, first-seen order.
    Health { labels: Vec<&'static str> },
    /// Nothing qualifies.
    Nothing,
}

impl CaregiverFinding {
    /// Scan safety records, then health records.
    pub fn find(safety: &[Record], health: &[Record]) -> Self {
        if let Some(fall) = safety
            .iter()
            .map(SafetyRecord::from)
            .find(|r| r.fall_detected && r.caregiver_notified)
        {
            return CaregiverFinding::Fall {
                timestamp: fall.timestamp,
                location: fall.location,
            };
        }

        let mut labels: Vec<&'static str> = Vec::new();
        for record in health.iter().filter(|r| !r.has_corrupted_timestamp()) {
            let vitals = HealthRecord::from(record);
            if !(vitals.alert_confirmed && vitals.caregiver_notified) {
                continue;
            }
            for label in threshold::evaluate(record, &HEALTH_RULES).labels() {
                if !labels.contains(&label) {
                    labels.push(label);
                }
            }
        }

        if labels.is_empty() {
            CaregiverFinding::Nothing
        } else {
            CaregiverFinding::Health { labels }
        }
    }
}

/// Compose the caregiver message for a batch.
pub async fn caregiver_notification(safety: &[Record], health: &[Record], persona: &Persona) -> String {
    match CaregiverFinding::find(safety, health) {
        CaregiverFinding::Fall { timestamp, location } => {
            let prompt = format!(
                "Create a notification for a caregiver about a fall at {} in {}.",
                timestamp, location
            );
            persona
                .respond(prompt, || {
                    format!("Caregiver alert: a fall was detected at {} in {}.", timestamp, location)
                })
                .await
        }
        CaregiverFinding::Health { labels } => {
            let labels = labels.join(", ");
            let prompt = format!("Create a notification for a caregiver about abnormal {}.", labels);
            persona
                .respond(prompt, || format!("Caregiver alert: abnormal {} detected.", labels))
                .await
        }
        CaregiverFinding::Nothing => NO_NOTIFICATIONS.to_string(),
    }
}
