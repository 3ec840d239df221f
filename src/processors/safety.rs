//! Fall and motion events.

use super::{ProcessedEntry, StreamOutput, in_order};
use crate::dispatch::AlertEvent;
use crate::persona::Persona;
use crate::record::{Record, SafetyRecord};
use crate::threshold::{self, SAFETY_RULES};

/// Subject line for fall alerts.
pub const FALL_ALERT_SUBJECT: &str = "URGENT: Fall Detected";

/// Phrase every fall entry carries; matched case-insensitively.
pub const FALL_MARKER: &str = "fall was detected";

/// Assess falls and describe everything else without calling the backend.
pub async fn process_safety(records: &[Record], persona: &Persona, concurrency: usize) -> StreamOutput {
    in_order(records, concurrency, |record| process_one(record, persona))
        .await
        .into_iter()
        .collect()
}

async fn process_one(record: &Record, persona: &Persona) -> (ProcessedEntry, Option<AlertEvent>) {
    let safety = SafetyRecord::from(record);

    if !safety.fall_detected {
        let message = format!("No fall detected. Activity: {} in {}.", safety.movement, safety.location);
        return (ProcessedEntry::new(safety.timestamp, message), None);
    }

    let details = format!(
        "Time: {}\nLocation: {}\nImpact Level: {}\nInactivity Duration: {} seconds",
        safety.timestamp, safety.location, safety.impact_level, safety.inactivity_seconds
    );
    let assessment = persona
        .respond(format!("A fall was detected:\n{}", details), fallback_message)
        .await;

    let evaluation = threshold::evaluate(record, &SAFETY_RULES);
    let alert = (evaluation.is_alert_worthy() && safety.alert_confirmed).then(|| {
        AlertEvent::new(
            FALL_ALERT_SUBJECT,
            format!("Fall Alert Details:\n{}\n\nAI Assessment:\n{}", details, assessment),
        )
    });

    let message = format!(
        "Alert! A {} in {} with {} impact. Inactivity duration: {} seconds. {}",
        FALL_MARKER, safety.location, safety.impact_level, safety.inactivity_seconds, assessment
    );
    (ProcessedEntry::new(safety.timestamp, message), alert)
}

/// Deterministic text when a fall cannot be assessed.
pub fn fallback_message() -> String {
    "Unable to analyze fall incident at this time. Please consult your caregiver.".to_string()
}

/// Whether a processed safety entry describes a fall.
pub fn is_fall_entry(entry: &ProcessedEntry) -> bool {
    entry.message.to_lowercase().contains(FALL_MARKER)
}
