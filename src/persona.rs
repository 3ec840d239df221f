//! Personas: fixed instruction preambles bound to a generative backend.
//!
//! Every assessment in the pipeline goes through a [`Persona`]. A persona
//! owns its failure handling: [`Persona::respond`] never fails, it applies
//! the persona's [`FailurePolicy`] instead.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::backend::{GenerationRequest, GenerativeBackend};
use crate::config::{BackendSettings, PipelineSettings};
use crate::error::{Error, Result};

/// Default per-assessment timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The role a persona plays in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PersonaRole {
    /// Friendly daily reminders.
    Reminder,
    /// Vital-sign assessment and health insights.
    Health,
    /// Fall assessment and safety recommendations.
    Safety,
    /// Messages addressed to caregivers.
    Caregiver,
    /// Ad hoc health questions.
    Assistant,
}

impl PersonaRole {
    /// All roles.
    pub const ALL: [PersonaRole; 5] = [
        PersonaRole::Reminder,
        PersonaRole::Health,
        PersonaRole::Safety,
        PersonaRole::Caregiver,
        PersonaRole::Assistant,
    ];

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            PersonaRole::Reminder => "Reminder Agent",
            PersonaRole::Health => "Health Agent",
            PersonaRole::Safety => "Safety Agent",
            PersonaRole::Caregiver => "Caregiver Agent",
            PersonaRole::Assistant => "Health Q&A Agent",
        }
    }

    /// Instruction preamble sent with every request.
    pub fn instructions(self) -> &'static str {
        match self {
            PersonaRole::Reminder => {
                "You are a Reminder Agent for an elderly care system. \
                 Your job is to provide clear, friendly reminders for daily tasks. \
                 Keep your responses brief, warm, and easy to understand for elderly users."
            }
            PersonaRole::Health => {
                "You are a Health Monitoring Agent for elderly users. \
                 Analyze the provided vital signs and indicate if there are any concerns."
            }
            PersonaRole::Safety => {
                "You are a Safety Monitoring Agent for elderly users. \
                 When a fall is detected, provide clear information about the incident and basic safety advice."
            }
            PersonaRole::Caregiver => {
                "You are a Caregiver Notification Agent. \
                 Create clear, informative messages for caregivers about critical incidents."
            }
            PersonaRole::Assistant => {
                "You are a Health Assistant for elderly users. \
                 Answer questions clearly and concisely. \
                 Include a short disclaimer recommending consultation with a healthcare professional for medical advice."
            }
        }
    }
}

impl fmt::Display for PersonaRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What a persona returns when its backend fails or times out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Embed the failure description in the message.
    InlineError,
    /// Substitute the caller's deterministic template.
    #[default]
    Fallback,
}

/// A user prompt plus an optional output cap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub text: String,
    pub max_output_tokens: Option<u32>,
}

impl Prompt {
    /// Create an uncapped prompt.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            max_output_tokens: None,
        }
    }

    /// Cap generated tokens.
    pub fn max_output_tokens(mut self, limit: u32) -> Self {
        self.max_output_tokens = Some(limit);
        self
    }
}

impl From<String> for Prompt {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&str> for Prompt {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// A persona bound to a backend.
#[derive(Clone)]
pub struct Persona {
    role: PersonaRole,
    instructions: String,
    model: String,
    policy: FailurePolicy,
    timeout: Duration,
    backend: Arc<dyn GenerativeBackend>,
}

impl Persona {
    /// Create a persona with the role's default instructions.
    pub fn new(role: PersonaRole, backend: Arc<dyn GenerativeBackend>) -> Self {
        Self {
            role,
            instructions: role.instructions().to_string(),
            model: backend.default_model().to_string(),
            policy: FailurePolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            backend,
        }
    }

    /// Set the failure policy.
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Set the per-assessment timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn role(&self) -> PersonaRole {
        self.role
    }

    pub fn name(&self) -> &'static str {
        self.role.name()
    }

    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Ask the backend for an assessment.
    pub async fn assess(&self, prompt: impl Into<Prompt>) -> Result<String> {
        let prompt = prompt.into();
        log::debug!("{} processing: {}", self.name(), preview(&prompt.text));

        let request = GenerationRequest {
            model: self.model.clone(),
            instructions: self.instructions.clone(),
            prompt: prompt.text,
            max_output_tokens: prompt.max_output_tokens,
        };

        let text = tokio::time::timeout(self.timeout, self.backend.generate(&request))
            .await
            .map_err(|_| Error::Timeout {
                persona: self.name().to_string(),
                after: self.timeout,
            })??;

        log::debug!("{} response length: {} characters", self.name(), text.len());
        Ok(text)
    }

    /// Assess, applying the failure policy instead of failing.
    ///
    /// `fallback` is only evaluated under [`FailurePolicy::Fallback`].
    pub async fn respond<F>(&self, prompt: impl Into<Prompt>, fallback: F) -> String
    where
        F: FnOnce() -> String,
    {
        match self.assess(prompt).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Error with {} ({:?}): {}", self.name(), self.policy, e);
                match self.policy {
                    FailurePolicy::InlineError => format!("Error: {}", e),
                    FailurePolicy::Fallback => fallback(),
                }
            }
        }
    }
}

impl fmt::Debug for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Persona")
            .field("role", &self.role)
            .field("model", &self.model)
            .field("policy", &self.policy)
            .field("timeout", &self.timeout)
            .field("backend", &self.backend.name())
            .finish()
    }
}

/// First 50 characters of a prompt, for logs.
fn preview(text: &str) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(50).collect();
    if chars.next().is_some() { format!("{}...", head) } else { head }
}

/// One persona per role, built fresh for each batch run.
#[derive(Debug, Clone)]
pub struct Personas {
    pub reminder: Persona,
    pub health: Persona,
    pub safety: Persona,
    pub caregiver: Persona,
    pub assistant: Persona,
}

impl Personas {
    /// Build every persona against one backend.
    pub fn new(backend: Arc<dyn GenerativeBackend>, backend_settings: &BackendSettings, pipeline: &PipelineSettings) -> Self {
        let build = |role| {
            Persona::new(role, backend.clone())
                .with_policy(pipeline.policy_for(role))
                .with_timeout(backend_settings.timeout)
        };
        Self {
            reminder: build(PersonaRole::Reminder),
            health: build(PersonaRole::Health),
            safety: build(PersonaRole::Safety),
            caregiver: build(PersonaRole::Caregiver),
            assistant: build(PersonaRole::Assistant),
        }
    }

    /// Persona for a role.
    pub fn get(&self, role: PersonaRole) -> &Persona {
        match role {
            PersonaRole::Reminder => &self.reminder,
            PersonaRole::Health => &self.health,
            PersonaRole::Safety => &self.safety,
            PersonaRole::Caregiver => &self.caregiver,
            PersonaRole::Assistant => &self.assistant,
        }
    }
}
