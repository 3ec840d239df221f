//! Carewatch: elder-care monitoring and notification pipeline.
//!
//! Ingests reminder, vital-sign and fall telemetry, assesses each record with
//! a generative-text persona, dispatches confirmed alerts, and derives a
//! single caregiver message plus follow-up insights for every batch.

pub mod backend;
pub mod caregiver;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod insights;
pub mod loader;
pub mod persona;
pub mod pipeline;
pub mod processors;
pub mod record;
pub mod threshold;

pub use config::Config;
pub use dispatch::{AlertDispatcher, AlertEvent, NotificationTransport};
pub use error::{Error, Result};
pub use persona::{FailurePolicy, Persona, PersonaRole, Personas};
pub use pipeline::{BatchInput, BatchResult, Pipeline, RunReport};
pub use record::Record;
