//! Transport to the assistant endpoints
//!
//! The controller talks to the server through [`AssistantTransport`];
//! [`HttpTransport`] is the real implementation against the text-chat and
//! voice-chat endpoints. Tests script the trait directly.

use async_trait::async_trait;
use hermes_protocol::{ApiErrorBody, TextChatRequest, TextChatResponse, Turn, VoiceChatResponse};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Transport-level failures
#[derive(Debug, Error, Clone)]
pub enum TransportError {
    /// The server rejected the request (400/500 with a JSON error body)
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The server could not be reached or the request timed out
    #[error("network failure: {0}")]
    Network(String),

    /// The response body did not match the contract
    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The two conversation endpoints plus the intro shortcut
#[async_trait]
pub trait AssistantTransport: Send + Sync {
    /// `POST /api/text-chat`
    async fn send_text(
        &self,
        message: &str,
        history: &[Turn],
    ) -> Result<TextChatResponse, TransportError>;

    /// `POST /api/voice-chat` with a recorded clip
    async fn send_voice(
        &self,
        clip: Vec<u8>,
        mime: &str,
        history: &[Turn],
    ) -> Result<VoiceChatResponse, TransportError>;

    /// `POST /api/voice-chat` with the intro flag
    async fn request_intro(&self) -> Result<VoiceChatResponse, TransportError>;
}

/// HTTP implementation against a Hermes server
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the server at `base_url`
    pub fn new(base_url: impl Into<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Turn a non-success response into a `Rejected` error
    async fn rejection(response: reqwest::Response) -> TransportError {
        let status = response.status().as_u16();
        match response.json::<ApiErrorBody>().await {
            Ok(body) => TransportError::Rejected {
                status,
                message: body.error,
            },
            Err(_) => TransportError::Rejected {
                status,
                message: "unexpected error body".to_string(),
            },
        }
    }
}

#[async_trait]
impl AssistantTransport for HttpTransport {
    async fn send_text(
        &self,
        message: &str,
        history: &[Turn],
    ) -> Result<TextChatResponse, TransportError> {
        let request = TextChatRequest {
            message: message.to_string(),
            history: if history.is_empty() {
                None
            } else {
                Some(history.to_vec())
            },
        };

        debug!(chars = message.chars().count(), "sending text message");

        let response = self
            .http
            .post(self.url("/api/text-chat"))
            .json(&request)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }

    async fn send_voice(
        &self,
        clip: Vec<u8>,
        mime: &str,
        history: &[Turn],
    ) -> Result<VoiceChatResponse, TransportError> {
        let file = reqwest::multipart::Part::bytes(clip)
            .file_name("clip.webm")
            .mime_str(mime)
            .map_err(|e| TransportError::Malformed(format!("clip mime rejected: {}", e)))?;

        let history_json = serde_json::to_string(history)
            .map_err(|e| TransportError::Malformed(e.to_string()))?;

        let form = reqwest::multipart::Form::new()
            .part("audio", file)
            .text("history", history_json);

        debug!("submitting voice clip");

        let response = self
            .http
            .post(self.url("/api/voice-chat"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }

    async fn request_intro(&self) -> Result<VoiceChatResponse, TransportError> {
        let form = reqwest::multipart::Form::new().text("intro", "true");

        let response = self
            .http
            .post(self.url("/api/voice-chat"))
            .multipart(form)
            .send()
            .await
            .map_err(|e| TransportError::Network(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json()
            .await
            .map_err(|e| TransportError::Malformed(e.to_string()))
    }
}
