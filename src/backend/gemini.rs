//! Google Gemini client.
//!
//! Implements [`GenerativeBackend`] over the `generateContent` REST endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;

use super::{GenerationRequest, GenerativeBackend, http_client, send_with_retry, text_at};
use crate::error::{Error, Result};

/// Default base URL for the Gemini API.
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Default model.
const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API client.
pub struct GeminiBackend {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiBackend {
    /// Create a new Gemini client.
    pub fn new(api_key: Option<String>, base_url: Option<String>, model: Option<String>) -> Result<Self> {
        let api_key = api_key.ok_or_else(|| Error::Config("GEMINI_API_KEY not set".to_string()))?;

        Ok(Self {
            client: http_client()?,
            api_key,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            model
        )
    }
}

#[async_trait]
impl GenerativeBackend for GeminiBackend {
    fn name(&self) -> &str {
        "gemini"
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = GeminiRequest::from(request);
        let url = self.endpoint(&request.model);

        let response = send_with_retry(self.name(), || {
            self.client
                .post(&url)
                .header("x-goog-api-key", &self.api_key)
                .json(&body)
        })
        .await?;

        extract_text(&response).ok_or_else(|| Error::EmptyResponse {
            provider: self.name().to_string(),
        })
    }
}

/// Pull the generated text out of a response.
///
/// Reads `candidates[0].content.parts[*].text`; older response shapes carry
/// it at `output[0].content[0].text` instead.
fn extract_text(response: &Value) -> Option<String> {
    let primary = response
        .pointer("/candidates/0/content/parts")
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(Value::as_str))
                .collect::<String>()
        })
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty());

    primary.or_else(|| text_at(response, "/output/0/content/0/text"))
}

// Gemini API types

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

impl From<&GenerationRequest> for GeminiRequest {
    fn from(request: &GenerationRequest) -> Self {
        let system_instruction = (!request.instructions.is_empty()).then(|| Content {
            role: None,
            parts: vec![Part {
                text: request.instructions.clone(),
            }],
        });

        Self {
            system_instruction,
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: request.prompt.clone(),
                }],
            }],
            generation_config: request.max_output_tokens.map(|max_output_tokens| GenerationConfig {
                max_output_tokens,
            }),
        }
    }
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(max_output_tokens: Option<u32>) -> GenerationRequest {
        GenerationRequest {
            model: "gemini-2.5-flash".to_string(),
            instructions: "You are a Health Monitoring Agent.".to_string(),
            prompt: "Analyze these health metrics".to_string(),
            max_output_tokens,
        }
    }

    #[test]
    fn test_new_requires_key() {
        assert!(GeminiBackend::new(None, None, None).is_err());

        let backend = GeminiBackend::new(Some("k".to_string()), None, None).unwrap();
        assert_eq!(backend.default_model(), "gemini-2.5-flash");
        assert_eq!(
            backend.endpoint("gemini-2.5-flash"),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_body() {
        let body = serde_json::to_value(GeminiRequest::from(&request(Some(400)))).unwrap();
        assert_eq!(
            body,
            json!({
                "systemInstruction": {"parts": [{"text": "You are a Health Monitoring Agent."}]},
                "contents": [{"role": "user", "parts": [{"text": "Analyze these health metrics"}]}],
                "generationConfig": {"maxOutputTokens": 400}
            })
        );

        let body = serde_json::to_value(GeminiRequest::from(&request(None))).unwrap();
        assert!(body.get("generationConfig").is_none());
    }

    #[test]
    fn test_extract_text_primary() {
        let response = json!({
            "candidates": [{"content": {"parts": [{"text": "Your heart rate "}, {"text": "is high. "}]}}]
        });
        assert_eq!(extract_text(&response), Some("Your heart rate is high.".to_string()));
    }

    #[test]
    fn test_extract_text_alternate() {
        let response = json!({"output": [{"content": [{"text": " Stay hydrated. "}]}]});
        assert_eq!(extract_text(&response), Some("Stay hydrated.".to_string()));
    }

    #[test]
    fn test_extract_text_missing() {
        let response = json!({"candidates": [{"finishReason": "SAFETY"}]});
        assert_eq!(extract_text(&response), None);
    }
}
