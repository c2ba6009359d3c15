//! Generator backed by the Gemini REST API (`generateContent`).

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use super::base::{parse_history_output, GenerationRequest, HistoryGenerator};
use crate::types::config::GeminiConfig;
use crate::types::history::HistoryData;
use crate::{ChronosError, ChronosResult};

/// Generator backed by Google Gemini structured output.
pub struct GeminiGenerator {
    client: Client,
    api_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl GeminiGenerator {
    /// Builds the generator from the TOML configuration.
    ///
    /// The API key is read once, here. A missing key is not an error until a
    /// request is made.
    pub fn from_config(config: &GeminiConfig) -> Self {
        Self {
            client: Client::new(),
            api_url: config.api_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key(),
            api_key_env: config.api_key_env.clone(),
        }
    }

    /// Overrides the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Whether an API key is available.
    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    /// Full URL of the `generateContent` call.
    pub fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.api_url, self.model)
    }

    /// Request body with the prompt and the response schema.
    fn request_body(&self, request: &GenerationRequest) -> serde_json::Value {
        json!({
            "contents": [
                { "parts": [ { "text": self.build_prompt(request) } ] }
            ],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": self.response_schema()
            }
        })
    }
}

#[async_trait]
impl HistoryGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "Gemini"
    }

    async fn generate(&self, request: &GenerationRequest) -> ChronosResult<HistoryData> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ChronosError::MissingApiKey(self.api_key_env.clone()))?;

        tracing::debug!(
            request_id = %request.request_id,
            model = %self.model,
            year = request.year,
            "Calling generateContent"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .header("Content-Type", "application/json")
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "unable to read error body".to_string());
            return Err(ChronosError::generator(
                self.name(),
                format!("API returned {}: {}", status, error_body),
            ));
        }

        let body: serde_json::Value = response.json().await?;
        let text = extract_candidate_text(&body, self.name())?;

        parse_history_output(&text, self.name())
    }
}

/// Extracts `candidates[0].content.parts[0].text` from a Gemini response.
fn extract_candidate_text(body: &serde_json::Value, generator_name: &str) -> ChronosResult<String> {
    body.get("candidates")
        .and_then(|c| c.get(0))
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.get(0))
        .and_then(|p| p.get("text"))
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
        .ok_or_else(|| {
            let reason = body
                .get("promptFeedback")
                .and_then(|f| f.get("blockReason"))
                .and_then(serde_json::Value::as_str)
                .map(|r| format!("prompt blocked: {}", r))
                .unwrap_or_else(|| "response missing candidates[0].content.parts[0].text".into());
            ChronosError::generator(generator_name, reason)
        })
}
