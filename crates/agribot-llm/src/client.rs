//! Gemini REST API client.
//!
//! Calls `generateContent` directly over HTTP; images travel as inline
//! base64 parts. No retries and no timeout beyond the transport defaults:
//! every call is a single, uncoordinated external request.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};

use agribot_core::config::LlmConfig;
use agribot_core::types::ImageAttachment;

use crate::error::LlmError;

/// A text-or-vision generation backend.
///
/// The trait is the seam between the core pipeline and the external model:
/// production code talks to [`GeminiClient`], tests inject scripted mocks.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate text from a prompt.
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError>;

    /// Generate text from a prompt and an attached image.
    async fn generate_vision(
        &self,
        prompt: &str,
        image: &ImageAttachment,
    ) -> Result<String, LlmError>;
}

/// Client for the Gemini `generateContent` REST endpoint.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    /// Create a new client with the provided API key and model.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: LlmConfig::default().base_url,
        }
    }

    /// Build a client from configuration.
    ///
    /// Fails fast when no API key can be resolved: this is a startup
    /// configuration error, not a per-call condition.
    pub fn from_config(config: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = config.resolve_api_key().ok_or(LlmError::MissingApiKey)?;
        Ok(Self {
            client: Client::new(),
            api_key,
            model: config.model.clone(),
            base_url: config.base_url.clone(),
        })
    }

    /// Overrides the model after construction.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn send_request(&self, parts: Vec<Part>) -> Result<String, LlmError> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts,
            }],
        };

        let url = format!(
            "{}/{model}:generateContent?key={api_key}",
            self.base_url,
            model = self.model,
            api_key = self.api_key
        );

        let response = self
            .client
            .post(url)
            .json(&request)
            .send()
            .await
            .map_err(|err| LlmError::Http(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "failed to read error body".to_string());
            return Err(map_http_error(status, body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|err| LlmError::InvalidResponse(err.to_string()))?;

        extract_text(parsed)
    }
}

#[async_trait]
impl LanguageModel for GeminiClient {
    async fn generate_text(&self, prompt: &str) -> Result<String, LlmError> {
        tracing::debug!(model = %self.model, prompt_len = prompt.len(), "Text generation request");
        self.send_request(vec![Part::Text {
            text: prompt.to_string(),
        }])
        .await
    }

    async fn generate_vision(
        &self,
        prompt: &str,
        image: &ImageAttachment,
    ) -> Result<String, LlmError> {
        tracing::debug!(
            model = %self.model,
            mime_type = %image.mime_type,
            image_bytes = image.bytes.len(),
            "Vision generation request"
        );
        let parts = vec![
            Part::Text {
                text: prompt.to_string(),
            },
            Part::InlineData {
                inline_data: InlineDataPayload {
                    mime_type: image.mime_type.clone(),
                    data: BASE64_STANDARD.encode(&image.bytes),
                },
            },
        ];
        self.send_request(parts).await
    }
}

// =============================================================================
// Wire format
// =============================================================================

#[derive(Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Serialize)]
struct Content {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineDataPayload,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineDataPayload {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<ContentResponse>,
}

#[derive(Deserialize)]
struct ContentResponse {
    parts: Vec<PartResponse>,
}

#[derive(Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
    status: Option<String>,
}

fn extract_text(response: GenerateContentResponse) -> Result<String, LlmError> {
    response
        .candidates
        .and_then(|mut candidates| candidates.pop())
        .and_then(|candidate| candidate.content)
        .and_then(|content| content.parts.into_iter().find_map(|part| part.text))
        .map(|text| text.trim().to_string())
        .ok_or(LlmError::EmptyResponse)
}

fn map_http_error(status: StatusCode, body: String) -> LlmError {
    let message = serde_json::from_str::<ErrorWrapper>(&body)
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or(body);

    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_response(text: &str) -> GenerateContentResponse {
        GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(ContentResponse {
                    parts: vec![PartResponse {
                        text: Some(text.to_string()),
                    }],
                }),
            }]),
        }
    }

    // ---- Response extraction ----

    #[test]
    fn test_extract_text_trims_whitespace() {
        let result = extract_text(text_response("  advice text \n")).unwrap();
        assert_eq!(result, "advice text");
    }

    #[test]
    fn test_extract_text_no_candidates() {
        let response = GenerateContentResponse { candidates: None };
        assert!(matches!(
            extract_text(response),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_text_empty_candidates() {
        let response = GenerateContentResponse {
            candidates: Some(vec![]),
        };
        assert!(matches!(
            extract_text(response),
            Err(LlmError::EmptyResponse)
        ));
    }

    #[test]
    fn test_extract_text_candidate_without_text_parts() {
        let response = GenerateContentResponse {
            candidates: Some(vec![Candidate {
                content: Some(ContentResponse {
                    parts: vec![PartResponse { text: None }],
                }),
            }]),
        };
        assert!(matches!(
            extract_text(response),
            Err(LlmError::EmptyResponse)
        ));
    }

    // ---- HTTP error mapping ----

    #[test]
    fn test_map_http_error_structured_body() {
        let body = r#"{"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}}"#;
        let err = map_http_error(StatusCode::TOO_MANY_REQUESTS, body.to_string());
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 429);
                assert_eq!(message, "RESOURCE_EXHAUSTED: Quota exceeded");
            }
            other => panic!("expected Api error, got: {other}"),
        }
    }

    #[test]
    fn test_map_http_error_unstructured_body() {
        let err = map_http_error(StatusCode::BAD_GATEWAY, "<html>502</html>".to_string());
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message, "<html>502</html>");
            }
            other => panic!("expected Api error, got: {other}"),
        }
    }

    // ---- Request serialization ----

    #[test]
    fn test_text_part_serialization() {
        let part = Part::Text {
            text: "hello".to_string(),
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(json, serde_json::json!({"text": "hello"}));
    }

    #[test]
    fn test_inline_data_part_serialization() {
        let part = Part::InlineData {
            inline_data: InlineDataPayload {
                mime_type: "image/jpeg".to_string(),
                data: BASE64_STANDARD.encode(b"abc"),
            },
        };
        let json = serde_json::to_value(&part).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "inlineData": {"mimeType": "image/jpeg", "data": "YWJj"}
            })
        );
    }

    // ---- Construction ----

    #[test]
    fn test_from_config_without_key_fails() {
        let config = LlmConfig::default();
        if std::env::var("GOOGLE_API_KEY").is_err() {
            assert!(matches!(
                GeminiClient::from_config(&config),
                Err(LlmError::MissingApiKey)
            ));
        }
    }

    #[test]
    fn test_from_config_with_key() {
        let config = LlmConfig {
            api_key: Some("k".to_string()),
            model: "gemini-1.5-flash".to_string(),
            ..LlmConfig::default()
        };
        let client = GeminiClient::from_config(&config).unwrap();
        assert_eq!(client.model(), "gemini-1.5-flash");
    }

    #[test]
    fn test_with_model_override() {
        let client = GeminiClient::new("k", "gemini-1.5-flash").with_model("gemini-2.0-flash");
        assert_eq!(client.model(), "gemini-2.0-flash");
    }
}
