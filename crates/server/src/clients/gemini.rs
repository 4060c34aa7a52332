//! Chat-completion client for the generative-language service

use crate::clients::failure::ChatFailure;
use crate::clients::ChatModel;
use crate::config::{ChatConfig, REMOTE_TIMEOUT};
use async_trait::async_trait;
use hermes_protocol::Turn;
use serde_json::json;
use tracing::debug;

/// Client for the Gemini `generateContent` endpoint
pub struct GeminiChat {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: String,
    max_output_tokens: u32,
    temperature: f32,
}

impl GeminiChat {
    /// Create a client from configuration plus the verified credential
    pub fn new(config: &ChatConfig, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key,
            max_output_tokens: config.max_output_tokens,
            temperature: config.temperature,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }

    /// Pull the first candidate's text out of a response body
    fn extract_text(body: &serde_json::Value) -> Option<String> {
        let parts = body
            .get("candidates")?
            .as_array()?
            .first()?
            .get("content")?
            .get("parts")?
            .as_array()?;

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[async_trait]
impl ChatModel for GeminiChat {
    async fn generate(&self, turns: &[Turn]) -> Result<String, ChatFailure> {
        let request = json!({
            "contents": turns,
            "generationConfig": {
                "maxOutputTokens": self.max_output_tokens,
                "temperature": self.temperature,
            },
        });

        debug!(turns = turns.len(), model = %self.model, "requesting chat completion");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ChatFailure::Service {
                status: status.as_u16(),
                body,
            });
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ChatFailure::Malformed(e.to_string()))?;

        Self::extract_text(&body).ok_or(ChatFailure::EmptyReply)
    }
}
