//! CSV ingestion for the three telemetry streams.

use std::path::Path;

use crate::config::DataSettings;
use crate::error::Result;
use crate::record::Record;

/// Load every row of a CSV file as a [`Record`].
///
/// A missing file yields no records; a malformed one is an error.
pub fn load_csv(path: &Path) -> Result<Vec<Record>> {
    if !path.exists() {
        log::warn!("File {} not found", path.display());
        return Ok(Vec::new());
    }

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_path(path)?;
    let headers = reader.headers()?.clone();

    let mut records: Vec<Record> = Vec::new();
    for row in reader.records() {
        let row = row?;
        records.push(headers.iter().zip(row.iter()).collect::<Record>());
    }

    log::debug!("Loaded {} records from {}", records.len(), path.display());
    Ok(records)
}

/// Records for one batch run, with each stream's load result kept apart.
#[derive(Debug)]
pub struct Sources {
    pub reminders: Result<Vec<Record>>,
    pub health: Result<Vec<Record>>,
    pub safety: Result<Vec<Record>>,
}

/// Load all three streams named in the configuration.
pub fn load_sources(settings: &DataSettings) -> Sources {
    Sources {
        reminders: load_csv(&settings.reminders),
        health: load_csv(&settings.health),
        safety: load_csv(&settings.safety),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_csv() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("safety.csv");
        fs::write(
            &path,
            "Device-ID/User-ID,Timestamp,Movement Activity,Fall Detected,Location\n\
             D1000,1/20/2025 15:45,Lying,No,Living Room\n\
             D1001, 1/19/2025 19:46 ,No Movement,Yes,Bathroom\n",
        )
        .unwrap();

        let records = load_csv(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].text("Location"), "Living Room");
        assert_eq!(records[1].text("Timestamp"), "1/19/2025 19:46");
        assert!(records[1].flag("Fall Detected"));
    }

    #[test]
    fn test_missing_file_is_empty() {
        let temp = TempDir::new().unwrap();
        let records = load_csv(&temp.path().join("absent.csv")).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_short_row_defaults_missing_columns() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("health.csv");
        fs::write(&path, "Timestamp,Heart Rate,Alert Triggered\n1/22/2025 20:04,116\n").unwrap();

        let records = load_csv(&path).unwrap();
        assert_eq!(records[0].text("Heart Rate"), "116");
        assert_eq!(records[0].text("Alert Triggered"), "N/A");
    }

    #[test]
    fn test_load_sources_keeps_streams_apart() {
        let temp = TempDir::new().unwrap();
        let reminders = temp.path().join("reminders.csv");
        fs::write(&reminders, "Reminder Type,Scheduled Time\nMedication,9:00 AM\n").unwrap();

        let settings = DataSettings {
            reminders,
            health: temp.path().join("health.csv"),
            safety: temp.path().join("safety.csv"),
        };

        let sources = load_sources(&settings);
        assert_eq!(sources.reminders.unwrap().len(), 1);
        assert!(sources.health.unwrap().is_empty());
        assert!(sources.safety.unwrap().is_empty());
    }
}
