//! Pipeline orchestration.
//!
//! One [`Pipeline::run`] processes a static batch of records to completion:
//! reminders, health, safety (dispatching each stream's alerts as soon as
//! the stream is done), then the caregiver message and the insights.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::backend::{self, GenerativeBackend};
use crate::caregiver::caregiver_notification;
use crate::config::{BackendSettings, Config, PipelineSettings};
use crate::dispatch::{AlertDispatcher, DispatchOutcome, SmtpTransport};
use crate::error::{Error, Result};
use crate::insights::{health_insights, safety_analysis};
use crate::loader::Sources;
use crate::persona::{Personas, Prompt};
use crate::processors::{process_health, process_reminders, process_safety};
use crate::record::Record;

/// Output cap for ad hoc answers.
const ANSWER_MAX_TOKENS: u32 = 300;

/// Records for one batch run.
#[derive(Debug, Clone, Default)]
pub struct BatchInput {
    pub reminders: Vec<Record>,
    pub health: Vec<Record>,
    pub safety: Vec<Record>,
}

/// The aggregate result of a batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub reminders: Vec<String>,
    pub health: Vec<String>,
    pub safety: Vec<String>,
    pub caregiver: String,
    pub health_insights: Vec<String>,
    pub safety_analysis: Vec<String>,
    /// Streams that could not be loaded, by stream name.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub errors: BTreeMap<String, String>,
}

/// A batch result plus what happened to each alert.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub result: BatchResult,
    pub dispatches: Vec<DispatchOutcome>,
}

/// The monitoring and notification pipeline.
pub struct Pipeline {
    backend: Arc<dyn GenerativeBackend>,
    backend_settings: BackendSettings,
    settings: PipelineSettings,
    dispatcher: AlertDispatcher,
}

impl Pipeline {
    /// Create a pipeline from its collaborators.
    pub fn new(
        backend: Arc<dyn GenerativeBackend>,
        backend_settings: BackendSettings,
        settings: PipelineSettings,
        dispatcher: AlertDispatcher,
    ) -> Self {
        Self {
            backend,
            backend_settings,
            settings,
            dispatcher,
        }
    }

    /// Build the configured backend and SMTP dispatcher.
    ///
    /// With notifications enabled the SMTP pool is started on the current
    /// tokio runtime, so call this from inside one.
    pub fn from_config(config: &Config) -> Result<Self> {
        let backend = backend::from_settings(&config.backend)?;
        let dispatcher = if config.notifications.enabled {
            AlertDispatcher::new(
                Arc::new(SmtpTransport::new(&config.notifications)?),
                config.notifications.recipients.clone(),
                true,
            )
        } else {
            AlertDispatcher::disabled()
        };
        Ok(Self::new(
            backend,
            config.backend.clone(),
            config.pipeline.clone(),
            dispatcher,
        ))
    }

    /// Fresh personas for one run.
    fn personas(&self) -> Personas {
        Personas::new(self.backend.clone(), &self.backend_settings, &self.settings)
    }

    /// Process one batch.
    pub async fn run(&self, input: BatchInput) -> RunReport {
        let personas = self.personas();
        let concurrency = self.settings.concurrency;
        let mut dispatches = Vec::new();

        log::info!(
            "Running batch: {} reminders, {} health, {} safety records",
            input.reminders.len(),
            input.health.len(),
            input.safety.len()
        );
        if !self.dispatcher.is_enabled() {
            log::warn!("Email notifications are disabled, alerts will not be delivered");
        }

        let reminders = process_reminders(&input.reminders, &personas.reminder, concurrency).await;

        let health = process_health(&input.health, &personas.health, concurrency).await;
        dispatches.extend(self.dispatcher.dispatch_all(&health.alerts).await);

        let safety = process_safety(&input.safety, &personas.safety, concurrency).await;
        dispatches.extend(self.dispatcher.dispatch_all(&safety.alerts).await);

        let caregiver = caregiver_notification(&input.safety, &input.health, &personas.caregiver).await;
        let health_insights = health_insights(&health.entries, &personas.health).await;
        let safety_analysis = safety_analysis(&safety.entries, &personas.safety).await;

        let delivered = dispatches.iter().filter(|d| d.delivered).count();
        log::info!("Batch complete: {}/{} alerts delivered", delivered, dispatches.len());

        RunReport {
            result: BatchResult {
                reminders: reminders.rendered(),
                health: health.rendered(),
                safety: safety.rendered(),
                caregiver,
                health_insights,
                safety_analysis,
                errors: BTreeMap::new(),
            },
            dispatches,
        }
    }

    /// Process loaded sources; a stream that failed to load is reported in
    /// `errors` and treated as empty.
    pub async fn run_sources(&self, sources: Sources) -> RunReport {
        let mut errors = BTreeMap::new();
        let mut take = |name: &str, loaded: Result<Vec<Record>>| {
            loaded.unwrap_or_else(|e| {
                log::error!("Failed to load {} records: {}", name, e);
                errors.insert(name.to_string(), e.to_string());
                Vec::new()
            })
        };

        let input = BatchInput {
            reminders: take("reminders", sources.reminders),
            health: take("health", sources.health),
            safety: take("safety", sources.safety),
        };

        let mut report = self.run(input).await;
        report.result.errors = errors;
        report
    }

    /// Answer one free-text health question.
    pub async fn ask(&self, question: &str) -> Result<String> {
        let question = question.trim();
        if question.is_empty() {
            return Err(Error::Validation("No question provided".to_string()));
        }

        let persona = self.personas().assistant;
        let prompt = Prompt::new(question).max_output_tokens(ANSWER_MAX_TOKENS);
        Ok(persona
            .respond(prompt, || {
                "Sorry, I'm unable to answer your question right now. \
                 Please try again later or consult a healthcare provider."
                    .to_string()
            })
            .await)
    }

    /// Send a fixed test alert through the dispatcher.
    pub async fn test_alert(&self) -> bool {
        self.dispatcher.dispatch("Test Email", "This is a test email.").await
    }
}
