//! Vital signs.

use super::{ProcessedEntry, StreamOutput, in_order};
use crate::dispatch::AlertEvent;
use crate::persona::Persona;
use crate::record::{HealthRecord, Record, columns};
use crate::threshold::{self, HEALTH_RULES};

/// Subject line for vital-sign alerts.
pub const HEALTH_ALERT_SUBJECT: &str = "HEALTH ALERT: Abnormal Vital Signs";

/// Assess vital-sign records and raise alerts for confirmed abnormal readings.
///
/// Records with a corrupted timestamp are dropped before assessment.
pub async fn process_health(records: &[Record], persona: &Persona, concurrency: usize) -> StreamOutput {
    let kept = records.iter().filter(|record| {
        let corrupted = record.has_corrupted_timestamp();
        if corrupted {
            log::debug!("Skipping health record with corrupted timestamp: {}", record.text(columns::TIMESTAMP));
        }
        !corrupted
    });

    in_order(kept, concurrency, |record| process_one(record, persona))
        .await
        .into_iter()
        .collect()
}

async fn process_one(record: &Record, persona: &Persona) -> (ProcessedEntry, Option<AlertEvent>) {
    let health = HealthRecord::from(record);
    let yes_no = |flag: bool| if flag { "Yes" } else { "No" };

    let prompt = format!(
        "Analyze these health metrics:\n\
         Time: {}\n\
         Heart Rate: {} bpm (Abnormal: {})\n\
         Blood Pressure: {} (Abnormal: {})\n\
         Glucose: {} mg/dL (Abnormal: {})\n\
         Oxygen Saturation: {}% (Below threshold: {})",
        health.timestamp,
        health.heart_rate,
        yes_no(health.heart_rate_abnormal),
        health.blood_pressure,
        yes_no(health.blood_pressure_abnormal),
        health.glucose,
        yes_no(health.glucose_abnormal),
        health.oxygen,
        yes_no(health.oxygen_low),
    );
    let message = persona.respond(prompt, || fallback_message(&health)).await;

    let evaluation = threshold::evaluate(record, &HEALTH_RULES);
    let alert = (evaluation.is_alert_worthy() && health.alert_confirmed).then(|| {
        AlertEvent::new(
            HEALTH_ALERT_SUBJECT,
            format!(
                "Health Alert at {}\n\nAlert Conditions:\n{}\n\nAI Assessment:\n{}",
                health.timestamp,
                evaluation.bullet_list(),
                message
            ),
        )
    });

    (ProcessedEntry::new(health.timestamp, message), alert)
}

/// Deterministic summary of the readings.
pub fn fallback_message(health: &HealthRecord) -> String {
    format!(
        "Vital signs at {}: heart rate {} bpm, blood pressure {}, glucose {} mg/dL, oxygen saturation {}%.",
        health.timestamp, health.heart_rate, health.blood_pressure, health.glucose, health.oxygen
    )
}
