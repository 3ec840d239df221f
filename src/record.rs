//! Telemetry records and their per-stream schemas.
//!
//! A [`Record`] is one ingested row: an ordered list of column name / value
//! pairs. The typed views ([`ReminderRecord`], [`HealthRecord`],
//! [`SafetyRecord`]) read a fixed set of columns and default anything absent
//! or blank to [`MISSING`], so malformed rows flow through rather than fail.

use serde::{Deserialize, Serialize};

/// Placeholder for a missing or blank field.
pub const MISSING: &str = "N/A";

/// Fill pattern left in a timestamp cell that was too narrow to render.
pub const CORRUPTED_TIMESTAMP_MARKER: &str = "####";

/// Column names, one module per stream.
pub mod columns {
    pub const DEVICE_ID: &str = "Device-ID/User-ID";
    pub const TIMESTAMP: &str = "Timestamp";
    pub const ALERT_TRIGGERED: &str = "Alert Triggered";
    pub const CAREGIVER_NOTIFIED: &str = "Caregiver Notified (Yes/No)";

    pub mod reminder {
        pub const TYPE: &str = "Reminder Type";
        pub const SCHEDULED_TIME: &str = "Scheduled Time";
        pub const SENT: &str = "Reminder Sent";
        pub const ACKNOWLEDGED: &str = "Acknowledged (Yes/No)";
    }

    pub mod health {
        pub const HEART_RATE: &str = "Heart Rate";
        pub const HEART_RATE_FLAG: &str = "Heart Rate Below/Above Threshold";
        pub const BLOOD_PRESSURE: &str = "Blood Pressure";
        pub const BLOOD_PRESSURE_FLAG: &str = "Blood Pressure Below/Above Threshold";
        pub const GLUCOSE: &str = "Glucose Levels";
        pub const GLUCOSE_FLAG: &str = "Glucose Levels Below/Above Threshold";
        pub const OXYGEN: &str = "Oxygen Saturation";
        pub const OXYGEN_FLAG: &str = "SpO2 Below Threshold";
    }

    pub mod safety {
        pub const MOVEMENT: &str = "Movement Activity";
        pub const FALL_DETECTED: &str = "Fall Detected";
        pub const IMPACT: &str = "Impact Force Level";
        pub const INACTIVITY: &str = "Post-Fall Inactivity Duration (Seconds)";
        pub const LOCATION: &str = "Location";
    }
}

/// One row of ingested telemetry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.push((name.into(), value.into()));
        self
    }

    /// Raw value of a field, if present and not blank.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Value of a field, or [`MISSING`].
    pub fn text(&self, name: &str) -> &str {
        self.get(name).unwrap_or(MISSING)
    }

    /// True only when the field holds the literal `Yes`.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name) == Some("Yes")
    }

    /// Whether the timestamp carries the spreadsheet fill pattern.
    pub fn has_corrupted_timestamp(&self) -> bool {
        self.get(columns::TIMESTAMP)
            .is_some_and(|ts| ts.contains(CORRUPTED_TIMESTAMP_MARKER))
    }

    /// Fields in column order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Record
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}

/// A daily reminder row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderRecord {
    pub device_id: String,
    pub reminder_type: String,
    pub scheduled_time: String,
    pub sent: bool,
    pub acknowledged: bool,
}

impl From<&Record> for ReminderRecord {
    fn from(record: &Record) -> Self {
        use columns::reminder::*;
        Self {
            device_id: record.text(columns::DEVICE_ID).to_string(),
            reminder_type: record.text(TYPE).to_string(),
            scheduled_time: record.text(SCHEDULED_TIME).to_string(),
            sent: record.flag(SENT),
            acknowledged: record.flag(ACKNOWLEDGED),
        }
    }
}

/// A vital-signs row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HealthRecord {
    pub device_id: String,
    pub timestamp: String,
    pub heart_rate: String,
    pub heart_rate_abnormal: bool,
    pub blood_pressure: String,
    pub blood_pressure_abnormal: bool,
    pub glucose: String,
    pub glucose_abnormal: bool,
    pub oxygen: String,
    pub oxygen_low: bool,
    pub alert_confirmed: bool,
    pub caregiver_notified: bool,
}

impl From<&Record> for HealthRecord {
    fn from(record: &Record) -> Self {
        use columns::health::*;
        Self {
            device_id: record.text(columns::DEVICE_ID).to_string(),
            timestamp: record.text(columns::TIMESTAMP).to_string(),
            heart_rate: record.text(HEART_RATE).to_string(),
            heart_rate_abnormal: record.flag(HEART_RATE_FLAG),
            blood_pressure: record.text(BLOOD_PRESSURE).to_string(),
            blood_pressure_abnormal: record.flag(BLOOD_PRESSURE_FLAG),
            glucose: record.text(GLUCOSE).to_string(),
            glucose_abnormal: record.flag(GLUCOSE_FLAG),
            oxygen: record.text(OXYGEN).to_string(),
            oxygen_low: record.flag(OXYGEN_FLAG),
            alert_confirmed: record.flag(columns::ALERT_TRIGGERED),
            caregiver_notified: record.flag(columns::CAREGIVER_NOTIFIED),
        }
    }
}

/// A fall / motion row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SafetyRecord {
    pub device_id: String,
    pub timestamp: String,
    pub movement: String,
    pub fall_detected: bool,
    pub impact_level: String,
    pub inactivity_seconds: String,
    pub location: String,
    pub alert_confirmed: bool,
    pub caregiver_notified: bool,
}

impl From<&Record> for SafetyRecord {
    fn from(record: &Record) -> Self {
        use columns::safety::*;
        Self {
            device_id: record.text(columns::DEVICE_ID).to_string(),
            timestamp: record.text(columns::TIMESTAMP).to_string(),
            movement: record.text(MOVEMENT).to_string(),
            fall_detected: record.flag(FALL_DETECTED),
            impact_level: record.text(IMPACT).to_string(),
            inactivity_seconds: record.text(INACTIVITY).to_string(),
            location: record.text(LOCATION).to_string(),
            alert_confirmed: record.flag(columns::ALERT_TRIGGERED),
            caregiver_notified: record.flag(columns::CAREGIVER_NOTIFIED),
        }
    }
}
