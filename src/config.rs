//! Configuration for Carewatch.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use eyre::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::persona::{FailurePolicy, PersonaRole};

/// Config file name looked up in each candidate directory.
const CONFIG_FILE: &str = "carewatch.yml";

/// Carewatch configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Input data locations.
    pub data: DataSettings,
    /// Generative backend selection.
    pub backend: BackendSettings,
    /// Pipeline behaviour.
    pub pipeline: PipelineSettings,
    /// Alert notification channel.
    pub notifications: NotificationSettings,
}

impl Config {
    /// Load configuration.
    ///
    /// An explicit path must load. Otherwise the user config directory and
    /// then the working directory are tried; an unreadable candidate is
    /// logged and skipped, and defaults apply when none loads.
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).with_context(|| format!("Failed to load config from {}", path.display()));
        }

        let candidates = dirs::config_dir()
            .map(|dir| dir.join("carewatch").join(CONFIG_FILE))
            .into_iter()
            .chain(std::iter::once(PathBuf::from(CONFIG_FILE)));

        for candidate in candidates.filter(|path| path.exists()) {
            match Self::load_from_file(&candidate) {
                Ok(config) => return Ok(config),
                Err(e) => log::warn!("Skipping config {}: {:#}", candidate.display(), e),
            }
        }

        log::info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Fill unset secrets and recipients from the process environment.
    ///
    /// Called once at startup; nothing downstream reads the environment.
    pub fn with_env(self) -> Self {
        self.with_env_from(|key| std::env::var(key).ok())
    }

    /// Same as [`Config::with_env`] with an explicit lookup.
    pub fn with_env_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.backend.api_key.is_none() {
            self.backend.api_key = lookup("GEMINI_API_KEY").filter(|v| !v.is_empty());
        }
        if self.notifications.sender.is_none() {
            self.notifications.sender = lookup("EMAIL_SENDER").filter(|v| !v.is_empty());
        }
        if self.notifications.password.is_none() {
            self.notifications.password = lookup("EMAIL_PASSWORD").filter(|v| !v.is_empty());
        }
        if self.notifications.recipients.is_empty()
            && let Some(list) = lookup("EMAIL_RECIPIENTS")
        {
            self.notifications.recipients = list
                .split(',')
                .map(str::trim)
                .filter(|r| !r.is_empty())
                .map(String::from)
                .collect();
        }
        self
    }

    /// Copy with secrets masked, for display.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        let mask = |v: &mut Option<String>| {
            if v.is_some() {
                *v = Some("********".to_string());
            }
        };
        mask(&mut config.backend.api_key);
        mask(&mut config.notifications.password);
        config
    }
}

/// CSV paths for the three telemetry streams.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DataSettings {
    /// Daily reminders.
    pub reminders: PathBuf,
    /// Vital signs.
    pub health: PathBuf,
    /// Fall and motion events.
    pub safety: PathBuf,
}

impl Default for DataSettings {
    fn default() -> Self {
        Self {
            reminders: PathBuf::from("backend/data/daily_reminder.csv"),
            health: PathBuf::from("backend/data/health_monitoring.csv"),
            safety: PathBuf::from("backend/data/safety_monitoring.csv"),
        }
    }
}

/// Which generative service backs the personas.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Google Gemini (remote).
    #[default]
    Gemini,
    /// Ollama (local model service).
    Ollama,
}

/// Generative backend settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendSettings {
    /// Provider to use.
    pub provider: BackendKind,
    /// Model identifier sent with every request (provider default if unset).
    pub model: Option<String>,
    /// API key (or use GEMINI_API_KEY env var).
    pub api_key: Option<String>,
    /// Override the provider's base URL.
    pub base_url: Option<String>,
    /// Per-assessment timeout.
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            provider: BackendKind::default(),
            model: None,
            api_key: None,
            base_url: None,
            timeout: Duration::from_secs(60),
        }
    }
}

/// Pipeline behaviour settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineSettings {
    /// What a persona returns when its backend fails.
    pub failure_policy: FailurePolicy,
    /// Per-persona overrides of `failure_policy`.
    pub policy_overrides: HashMap<PersonaRole, FailurePolicy>,
    /// Maximum in-flight assessments per stream (1 = sequential).
    pub concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            policy_overrides: HashMap::new(),
            concurrency: 1,
        }
    }
}

impl PipelineSettings {
    /// Effective failure policy for a persona role.
    pub fn policy_for(&self, role: PersonaRole) -> FailurePolicy {
        self.policy_overrides.get(&role).copied().unwrap_or(self.failure_policy)
    }
}

/// Email notification settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotificationSettings {
    /// Master switch; when off every dispatch reports `false`.
    pub enabled: bool,
    /// SMTP relay host.
    pub smtp_server: String,
    /// SMTP relay port (STARTTLS).
    pub smtp_port: u16,
    /// Sender address, also the SMTP login (or EMAIL_SENDER env var).
    pub sender: Option<String>,
    /// SMTP password (or EMAIL_PASSWORD env var).
    pub password: Option<String>,
    /// Alert recipients (or comma-separated EMAIL_RECIPIENTS env var).
    pub recipients: Vec<String>,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_server: "smtp.gmail.com".to_string(),
            smtp_port: 587,
            sender: None,
            password: None,
            recipients: Vec::new(),
        }
    }
}

// humantime_serde helper for duration serialization
mod humantime_serde {
    use std::time::Duration;

    use serde::{self, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        humantime::parse_duration(&s).map_err(serde::de::Error::custom)
    }
}
