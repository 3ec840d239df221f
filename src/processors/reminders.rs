//! Daily reminders.

use super::{ProcessedEntry, StreamOutput, in_order};
use crate::persona::{Persona, Prompt};
use crate::record::{Record, ReminderRecord};

/// Output cap for a reminder message.
const REMINDER_MAX_TOKENS: u32 = 60;

/// Turn reminder records into friendly messages.
///
/// Output is sorted on the rendered `"{time}: {message}"` string, not on
/// the parsed time, so `"10:00 AM"` sorts before `"9:00 AM"`.
pub async fn process_reminders(records: &[Record], persona: &Persona, concurrency: usize) -> StreamOutput {
    let mut entries = in_order(records, concurrency, |record| process_one(record, persona)).await;
    entries.sort_by_cached_key(ProcessedEntry::rendered);

    StreamOutput {
        entries,
        alerts: Vec::new(),
    }
}

async fn process_one(record: &Record, persona: &Persona) -> ProcessedEntry {
    let reminder = ReminderRecord::from(record);

    let prompt = Prompt::new(format!(
        "Create a friendly reminder for an elderly person about their {} scheduled at {}.",
        reminder.reminder_type, reminder.scheduled_time
    ))
    .max_output_tokens(REMINDER_MAX_TOKENS);

    let mut message = persona
        .respond(prompt, || fallback_message(&reminder.reminder_type, &reminder.scheduled_time))
        .await;

    if reminder.sent && reminder.acknowledged {
        message.push_str(" (Acknowledged)");
    } else if reminder.sent {
        message.push_str(" (Sent but not acknowledged)");
    }

    ProcessedEntry::new(reminder.scheduled_time, message)
}

/// Deterministic reminder text keyed on the reminder type.
pub fn fallback_message(reminder_type: &str, scheduled_time: &str) -> String {
    match reminder_type.to_lowercase().as_str() {
        "medication" => format!("Please remember to take your medication at {}.", scheduled_time),
        "hydration" => format!("It's time to drink water at {}.", scheduled_time),
        "exercise" => format!("Remember to do your exercise at {}.", scheduled_time),
        "appointment" => format!("You have an appointment scheduled for {}.", scheduled_time),
        _ => format!("Reminder: {} at {}.", reminder_type, scheduled_time),
    }
}
