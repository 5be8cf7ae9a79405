//! Gemini multimodal generation client
//!
//! Sends one rubric prompt plus the request images to the
//! `models/{model}:generateContent` endpoint and returns the critique text.
//! Every failure mode (transport, HTTP status, undecodable body, blocked or
//! empty answer) collapses into `CoachError::ExternalCallFailure`; there are
//! no retries.

use crate::config::DEFAULT_API_BASE_URL;
use crate::error::{CoachError, Result};
use crate::imaging::{self, PNG_MIME};
use crate::prompts::EvaluationRequest;
use crate::services::GenerativeModel;
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the Gemini client
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Google AI API key
    pub api_key: Option<SecretString>,

    /// Model to use (default: gemini-1.5-flash)
    pub model: String,

    /// API root, overridable for tests and proxies
    pub base_url: String,

    /// Timeout for a single generation call
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: crate::config::DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_API_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
        }
    }
}

/// Gemini API request format
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: &'static str,
    data: String,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text of the first candidate
    fn into_text(self) -> Result<String> {
        let block_reason = self.prompt_feedback.and_then(|f| f.block_reason);

        let candidate = self.candidates.into_iter().next().ok_or_else(|| {
            CoachError::ExternalCallFailure(match block_reason {
                Some(reason) => format!("prompt was blocked: {}", reason),
                None => "response contained no candidates".to_string(),
            })
        })?;

        let finish_reason = candidate.finish_reason;
        let text: String = candidate
            .content
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect()
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(CoachError::ExternalCallFailure(format!(
                "response has no text (finish reason: {})",
                finish_reason.as_deref().unwrap_or("unknown")
            )));
        }

        Ok(text)
    }
}

/// Gemini-backed [`GenerativeModel`]
pub struct GeminiService {
    config: GeminiConfig,
    client: reqwest::Client,
}

impl GeminiService {
    /// Create a new Gemini client with custom config
    ///
    /// A missing API key is not an error here; `generate` refuses to run
    /// without one.
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| CoachError::Other(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    fn build_body(request: &EvaluationRequest) -> Result<GenerateContentRequest> {
        let mut parts = Vec::with_capacity(request.images.len() + 1);
        parts.push(Part::Text {
            text: request.prompt.to_string(),
        });

        for image in &request.images {
            let png = imaging::encode_png(image)?;
            parts.push(Part::InlineData {
                inline_data: InlineData {
                    mime_type: PNG_MIME,
                    data: BASE64.encode(png),
                },
            });
        }

        Ok(GenerateContentRequest {
            contents: vec![Content {
                role: "user",
                parts,
            }],
        })
    }
}

#[async_trait]
impl GenerativeModel for GeminiService {
    async fn generate(&self, request: &EvaluationRequest) -> Result<String> {
        let api_key = self
            .config
            .api_key
            .as_ref()
            .ok_or(CoachError::MissingCredential)?;

        let body = Self::build_body(request)?;

        debug!(
            "Calling Gemini {} ({} mode, {} image(s))",
            self.config.model,
            request.mode,
            request.images.len()
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| CoachError::ExternalCallFailure(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CoachError::ExternalCallFailure(format!(
                "API request failed with status {}: {}",
                status, error_text
            )));
        }

        let api_response: GenerateContentResponse = response.json().await.map_err(|e| {
            CoachError::ExternalCallFailure(format!("Failed to parse response: {}", e))
        })?;

        let text = api_response.into_text()?;
        info!("Received critique ({} chars)", text.chars().count());
        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::EvaluationRequestBuilder;
    use crate::types::EvaluationMode;
    use image::DynamicImage;

    #[test]
    fn test_request_body_shape() {
        let request = EvaluationRequestBuilder::new(EvaluationMode::CopyScoring)
            .reference(DynamicImage::new_rgb8(2, 2))
            .submission(DynamicImage::new_rgb8(2, 2))
            .build()
            .unwrap();

        let body = serde_json::to_value(GeminiService::build_body(&request).unwrap()).unwrap();
        let parts = body["contents"][0]["parts"].as_array().unwrap();

        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0]["text"], request.prompt);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/png");
        assert!(parts[2]["inline_data"]["data"].as_str().unwrap().len() > 10);
    }

    #[test]
    fn test_response_text_is_concatenated() {
        let json = r#"{
            "candidates": [{
                "content": {"parts": [{"text": "総合評価: "}, {"text": "80点"}], "role": "model"},
                "finishReason": "STOP"
            }]
        }"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.into_text().unwrap(), "総合評価: 80点");
    }

    #[test]
    fn test_blocked_prompt_is_failure() {
        let json = r#"{"promptFeedback": {"blockReason": "SAFETY"}}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        let err = response.into_text().unwrap_err();
        assert!(err.to_string().contains("SAFETY"));
    }

    #[test]
    fn test_empty_text_is_failure() {
        let json = r#"{"candidates": [{"finishReason": "MAX_TOKENS"}]}"#;
        let response: GenerateContentResponse = serde_json::from_str(json).unwrap();
        assert!(matches!(
            response.into_text(),
            Err(CoachError::ExternalCallFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_without_key_is_missing_credential() {
        let service = GeminiService::new(GeminiConfig::default()).unwrap();
        let request = EvaluationRequestBuilder::new(EvaluationMode::StandardScoring)
            .submission(DynamicImage::new_rgb8(1, 1))
            .build()
            .unwrap();

        assert!(matches!(
            service.generate(&request).await,
            Err(CoachError::MissingCredential)
        ));
    }

    #[tokio::test]
    #[ignore] // Requires GOOGLE_API_KEY
    async fn test_generate_live() {
        let config = crate::config::CoachConfig::load(None).unwrap();
        let service = GeminiService::new(config.gemini()).unwrap();
        let request = EvaluationRequestBuilder::new(EvaluationMode::StandardScoring)
            .submission(DynamicImage::new_rgb8(64, 64))
            .build()
            .unwrap();

        let text = service.generate(&request).await.unwrap();
        assert!(!text.is_empty());
    }
}
