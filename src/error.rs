//! Error types for Carewatch.

use std::time::Duration;

use thiserror::Error;

/// Carewatch error type.
#[derive(Error, Debug)]
pub enum Error {
    /// Generative backend request failed
    #[error("backend error: {0}")]
    Backend(String),

    /// Backend answered but no text could be extracted
    #[error("{provider} returned no text")]
    EmptyResponse { provider: String },

    /// Assessment did not finish in time
    #[error("{persona} timed out after {}", humantime::format_duration(*.after))]
    Timeout { persona: String, after: Duration },

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Input validation error
    #[error("validation error: {0}")]
    Validation(String),

    /// Notification transport rejected a message
    #[error("dispatch error: {0}")]
    Dispatch(String),

    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parse error
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML serialization error
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type alias for Carewatch.
pub type Result<T> = std::result::Result<T, Error>;
