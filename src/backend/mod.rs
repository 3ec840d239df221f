//! Generative-text backend abstraction.
//!
//! Personas talk to a model only through [`GenerativeBackend`]; the remote
//! (Gemini) and local (Ollama) adapters are interchangeable and chosen from
//! configuration by [`from_settings`].

pub mod gemini;
pub mod ollama;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::Serialize;
use serde_json::Value;

use crate::config::{BackendKind, BackendSettings};
use crate::error::{Error, Result};

pub use gemini::GeminiBackend;
pub use ollama::OllamaBackend;

/// Attempts per request before giving up on retryable failures.
const MAX_ATTEMPTS: u32 = 3;

/// One text-generation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationRequest {
    /// Model identifier.
    pub model: String,
    /// System-level framing for the prompt.
    pub instructions: String,
    /// The user prompt.
    pub prompt: String,
    /// Optional cap on generated tokens.
    pub max_output_tokens: Option<u32>,
}

/// Trait for generative-text services.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Provider name, for logs and errors.
    fn name(&self) -> &str;

    /// Model used when a persona does not name one.
    fn default_model(&self) -> &str;

    /// Generate text for a request.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

/// Build the backend selected in configuration.
pub fn from_settings(settings: &BackendSettings) -> Result<Arc<dyn GenerativeBackend>> {
    let backend: Arc<dyn GenerativeBackend> = match settings.provider {
        BackendKind::Gemini => Arc::new(GeminiBackend::new(
            settings.api_key.clone(),
            settings.base_url.clone(),
            settings.model.clone(),
        )?),
        BackendKind::Ollama => Arc::new(OllamaBackend::new(settings.base_url.clone(), settings.model.clone())?),
    };
    log::info!(
        "Using {} backend with model {}",
        backend.name(),
        backend.default_model()
    );
    Ok(backend)
}

/// Build the shared HTTP client.
///
/// The per-assessment deadline is enforced by the persona; this is only a
/// backstop for connections that never complete.
fn http_client() -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(120))
        .build()
        .map_err(|e| Error::Backend(format!("Failed to create HTTP client: {}", e)))
}

/// Send a JSON request, retrying rate limits, server errors and transport
/// failures with exponential backoff.
async fn send_with_retry<F>(provider: &str, build: F) -> Result<Value>
where
    F: Fn() -> RequestBuilder,
{
    let mut last_error = None;
    for attempt in 0..MAX_ATTEMPTS {
        if attempt > 0 {
            let delay = Duration::from_millis(1000 * 2u64.pow(attempt));
            tokio::time::sleep(delay).await;
        }

        match build().send().await {
            Ok(resp) => {
                let status = resp.status();
                let body = resp.text().await.unwrap_or_default();

                if status.is_success() {
                    return serde_json::from_str(&body)
                        .map_err(|e| Error::Backend(format!("{}: failed to parse response: {} - {}", provider, e, body)));
                } else if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                    last_error = Some(Error::Backend(format!(
                        "{}: {} (attempt {}): {}",
                        provider,
                        status,
                        attempt + 1,
                        body
                    )));
                    continue;
                } else {
                    // Client error, don't retry
                    return Err(Error::Backend(format!("{}: API error {}: {}", provider, status, body)));
                }
            }
            Err(e) => {
                last_error = Some(Error::Backend(format!(
                    "{}: request failed (attempt {}): {}",
                    provider,
                    attempt + 1,
                    e
                )));
                continue;
            }
        }
    }

    Err(last_error.unwrap_or_else(|| Error::Backend(format!("{}: all retry attempts failed", provider))))
}

/// Trimmed, non-empty string at a JSON pointer.
fn text_at(body: &Value, pointer: &str) -> Option<String> {
    body.pointer(pointer)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
}


#[cfg(test)]
mod tests {
    use super::mock::{MockBackend, MockReply};
    use super::*;

    fn request(prompt: &str) -> GenerationRequest {
        GenerationRequest {
            model: "m".to_string(),
            instructions: "i".to_string(),
            prompt: prompt.to_string(),
            max_output_tokens: None,
        }
    }

    #[test]
    fn test_text_at() {
        let body = serde_json::json!({"response": "  hello  ", "blank": "   ", "n": 3});
        assert_eq!(text_at(&body, "/response"), Some("hello".to_string()));
        assert_eq!(text_at(&body, "/blank"), None);
        assert_eq!(text_at(&body, "/n"), None);
        assert_eq!(text_at(&body, "/absent"), None);
    }

    #[test]
    fn test_from_settings_selects_provider() {
        let settings = BackendSettings {
            provider: BackendKind::Ollama,
            ..Default::default()
        };
        let backend = from_settings(&settings).unwrap();
        assert_eq!(backend.name(), "ollama");
        assert_eq!(backend.default_model(), "llama3");

        let settings = BackendSettings {
            provider: BackendKind::Gemini,
            api_key: Some("key".to_string()),
            model: Some("gemini-2.0-flash".to_string()),
            ..Default::default()
        };
        let backend = from_settings(&settings).unwrap();
        assert_eq!(backend.name(), "gemini");
        assert_eq!(backend.default_model(), "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn test_mock_backend_script_then_fallback() {
        let backend = MockBackend::new(
            vec![MockReply::Text("first".to_string()), MockReply::Fail("down".to_string())],
            MockReply::Echo,
        );

        assert_eq!(backend.generate(&request("a")).await.unwrap(), "first");
        assert!(backend.generate(&request("b")).await.is_err());
        assert_eq!(backend.generate(&request("c")).await.unwrap(), "c");
        assert_eq!(backend.requests().len(), 3);
    }
}
