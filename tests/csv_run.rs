//! End-to-end run from CSV exports on disk.

use std::fs;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use carewatch::backend::{GenerationRequest, GenerativeBackend};
use carewatch::config::{BackendSettings, DataSettings, PipelineSettings};
use carewatch::error::Result;
use carewatch::loader::load_sources;
use carewatch::{AlertDispatcher, NotificationTransport, Pipeline};
use tempfile::TempDir;

struct CannedBackend;

#[async_trait]
impl GenerativeBackend for CannedBackend {
    fn name(&self) -> &str {
        "canned"
    }

    fn default_model(&self) -> &str {
        "canned-1"
    }

    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        Ok("Noted.".to_string())
    }
}

#[derive(Default)]
struct Outbox {
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl NotificationTransport for Outbox {
    async fn send(&self, subject: &str, _recipients: &[String], body: &str) -> Result<()> {
        self.sent.lock().unwrap().push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

const REMINDERS: &str = "\
Device-ID/User-ID,Timestamp,Reminder Type,Scheduled Time,Reminder Sent,Acknowledged (Yes/No)
D1000,1/10/2025 9:00,Medication,9:00 AM,Yes,Yes
D1000,1/10/2025 10:00,Exercise,10:00 AM,Yes,No
";

const HEALTH: &str = "\
Device-ID/User-ID,Timestamp,Heart Rate,Heart Rate Below/Above Threshold,Blood Pressure,Blood Pressure Below/Above Threshold,Glucose Levels,Glucose Levels Below/Above Threshold,Oxygen Saturation,SpO2 Below Threshold,Alert Triggered,Caregiver Notified (Yes/No)
D1000,1/22/2025 20:04,145,Yes,118/79 mmHg,No,102,No,97,No,Yes,Yes
D1000,##########,60,No,120/80 mmHg,No,95,No,98,No,No,No
";

const SAFETY: &str = "\
Device-ID/User-ID,Timestamp,Movement Activity,Fall Detected,Impact Force Level,Post-Fall Inactivity Duration (Seconds),Location,Alert Triggered,Caregiver Notified (Yes/No)
D1000,1/19/2025 19:46,No Movement,Yes,Medium,463,Bathroom,Yes,Yes
D1000,1/20/2025 8:15,Walking,No,-,0,Kitchen,No,No
";

fn write_sources(dir: &TempDir) -> DataSettings {
    let settings = DataSettings {
        reminders: dir.path().join("daily_reminder.csv"),
        health: dir.path().join("health_monitoring.csv"),
        safety: dir.path().join("safety_monitoring.csv"),
    };
    fs::write(&settings.reminders, REMINDERS).unwrap();
    fs::write(&settings.health, HEALTH).unwrap();
    fs::write(&settings.safety, SAFETY).unwrap();
    settings
}

fn pipeline(outbox: Arc<Outbox>) -> Pipeline {
    Pipeline::new(
        Arc::new(CannedBackend),
        BackendSettings::default(),
        PipelineSettings::default(),
        AlertDispatcher::new(outbox, vec!["family@example.com".to_string()], true),
    )
}

#[tokio::test]
async fn test_run_from_csv_files() {
    let dir = tempfile::tempdir().unwrap();
    let settings = write_sources(&dir);
    let outbox = Arc::new(Outbox::default());

    let report = pipeline(outbox.clone()).run_sources(load_sources(&settings)).await;
    let result = &report.result;

    assert!(result.errors.is_empty());
    assert_eq!(
        result.reminders,
        vec![
            "10:00 AM: Noted. (Sent but not acknowledged)".to_string(),
            "9:00 AM: Noted. (Acknowledged)".to_string(),
        ]
    );
    assert_eq!(result.health, vec!["1/22/2025 20:04: Noted.".to_string()]);
    assert_eq!(result.safety.len(), 2);
    assert!(result.safety[0].contains("fall was detected in Bathroom"));
    assert_eq!(result.caregiver, "Noted.");
    assert_eq!(result.health_insights, vec!["Noted.".to_string()]);
    assert_eq!(result.safety_analysis, vec!["Noted.".to_string()]);

    let sent = outbox.sent.lock().unwrap();
    let subjects: Vec<_> = sent.iter().map(|(s, _)| s.as_str()).collect();
    assert_eq!(subjects, vec!["HEALTH ALERT: Abnormal Vital Signs", "URGENT: Fall Detected"]);
    assert!(sent[0].1.contains("- Abnormal heart rate: 145 bpm"));
}

#[tokio::test]
async fn test_missing_files_run_empty() {
    let dir = tempfile::tempdir().unwrap();
    let settings = DataSettings {
        reminders: dir.path().join("absent_reminders.csv"),
        health: dir.path().join("absent_health.csv"),
        safety: dir.path().join("absent_safety.csv"),
    };
    let outbox = Arc::new(Outbox::default());

    let report = pipeline(outbox.clone()).run_sources(load_sources(&settings)).await;

    assert!(report.result.errors.is_empty());
    assert!(report.result.reminders.is_empty());
    assert_eq!(report.result.caregiver, "No recent caregiver notifications.");
    assert!(outbox.sent.lock().unwrap().is_empty());
}
