//! Ollama client for locally hosted models.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{GenerationRequest, GenerativeBackend, http_client, send_with_retry, text_at};
use crate::error::{Error, Result};

/// Default base URL for a local Ollama server.
const DEFAULT_BASE_URL: &str = "http://localhost:11434";

/// Default model.
const DEFAULT_MODEL: &str = "llama3";

/// Ollama API client.
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaBackend {
    /// Create a new Ollama client.
    pub fn new(base_url: Option<String>, model: Option<String>) -> Result<Self> {
        Ok(Self {
            client: http_client()?,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }
}

#[async_trait]
impl GenerativeBackend for OllamaBackend {
    fn name(&self) -> &str {
        "ollama"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = OllamaRequest::from(request);
        let url = format!("{}/api/generate", self.base_url.trim_end_matches('/'));

        let response = send_with_retry(self.name(), || self.client.post(&url).json(&body)).await?;

        extract_text(&response).ok_or_else(|| Error::EmptyResponse {
            provider: self.name().to_string(),
        })
    }
}

/// `response` for `/api/generate`, falling back to the chat-style
/// `message.content`.
fn extract_text(response: &Value) -> Option<String> {
    text_at(response, "/response").or_else(|| text_at(response, "/message/content"))
}

#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<Options>,
}

#[derive(Debug, Serialize)]
struct Options {
    num_predict: u32,
}

impl From<&GenerationRequest> for OllamaRequest {
    fn from(request: &GenerationRequest) -> Self {
        Self {
            model: request.model.clone(),
            prompt: request.prompt.clone(),
            system: (!request.instructions.is_empty()).then(|| request.instructions.clone()),
            stream: false,
            options: request.max_output_tokens.map(|num_predict| Options { num_predict }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_request_body() {
        let request = GenerationRequest {
            model: "llama3".to_string(),
            instructions: "You are a Reminder Agent.".to_string(),
            prompt: "Create a friendly reminder".to_string(),
            max_output_tokens: Some(60),
        };

        let body = serde_json::to_value(OllamaRequest::from(&request)).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "llama3",
                "prompt": "Create a friendly reminder",
                "system": "You are a Reminder Agent.",
                "stream": false,
                "options": {"num_predict": 60}
            })
        );
    }

    #[test]
    fn test_extract_text() {
        assert_eq!(
            extract_text(&json!({"response": "Time for your pills.\n"})),
            Some("Time for your pills.".to_string())
        );
        assert_eq!(
            extract_text(&json!({"message": {"role": "assistant", "content": "Drink water."}})),
            Some("Drink water.".to_string())
        );
        assert_eq!(extract_text(&json!({"response": ""})), None);
        assert_eq!(extract_text(&json!({"done": true})), None);
    }
}
