//! Failure taxonomy for the remote capabilities
//!
//! Provider-specific error codes and error-text patterns are mapped to the
//! internal taxonomy here and nowhere else. Every speech failure normalizes
//! outward to the same "voice service unavailable" signal; chat failures
//! are absorbed into the degraded-service reply by the handlers.

use thiserror::Error;

/// Ways the speech service (transcription or synthesis) can fail
///
/// All variants carry the same outward meaning: the voice service is
/// unavailable and the client should fall back to text mode.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SpeechFailure {
    /// No credential was configured at startup
    #[error("speech credential missing")]
    MissingCredential,

    /// The credential was rejected or malformed
    #[error("speech credential invalid")]
    InvalidCredential,

    /// The provider locked the account for anomalous usage
    #[error("speech provider flagged anomalous activity")]
    AnomalousActivity,

    /// The provider quota is exhausted
    #[error("speech quota exhausted")]
    QuotaExhausted,

    /// The provider is rate limiting
    #[error("speech requests rate limited")]
    RateLimited,

    /// The request exceeded its time bound
    #[error("speech request timed out")]
    Timeout,

    /// The provider could not be reached
    #[error("speech network failure")]
    Network,

    /// Transcription succeeded but produced no usable text
    #[error("transcription returned no text")]
    EmptyTranscript,

    /// Synthesis succeeded but produced no audio
    #[error("synthesis returned no audio")]
    EmptyAudio,

    /// Anything the classifier does not recognize
    #[error("unrecognized speech failure: {0}")]
    Unrecognized(String),
}

impl SpeechFailure {
    /// Classify a non-success provider response
    ///
    /// The provider reports structured errors as `{"detail": {"status": ...}}`;
    /// when the body is not JSON the known patterns are matched as substrings.
    pub fn classify_response(status: u16, body: &str) -> Self {
        if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) {
            if let Some(detail_status) = parsed
                .get("detail")
                .and_then(|d| d.get("status"))
                .and_then(|s| s.as_str())
            {
                return Self::from_provider_status(detail_status, status, body);
            }
        }

        // Non-JSON or unstructured body: fall back to substring matching
        if body.contains("detected_unusual_activity") {
            SpeechFailure::AnomalousActivity
        } else if body.contains("quota_exceeded") {
            SpeechFailure::QuotaExhausted
        } else if body.contains("rate_limit") {
            SpeechFailure::RateLimited
        } else if body.contains("invalid_api_key") || status == 401 {
            SpeechFailure::InvalidCredential
        } else {
            SpeechFailure::Unrecognized(format!("status {}: {}", status, truncate(body, 200)))
        }
    }

    /// Classify a transport-level failure from the HTTP client
    pub fn classify_transport(err: &reqwest::Error) -> Self {
        if err.is_timeout() {
            SpeechFailure::Timeout
        } else if err.is_connect() || err.is_request() {
            SpeechFailure::Network
        } else {
            SpeechFailure::Unrecognized(err.to_string())
        }
    }

    fn from_provider_status(detail_status: &str, http_status: u16, body: &str) -> Self {
        match detail_status {
            "detected_unusual_activity" => SpeechFailure::AnomalousActivity,
            "invalid_api_key" => SpeechFailure::InvalidCredential,
            "quota_exceeded" => SpeechFailure::QuotaExhausted,
            "rate_limit_exceeded" => SpeechFailure::RateLimited,
            other => SpeechFailure::Unrecognized(format!(
                "status {}: {} ({})",
                http_status,
                other,
                truncate(body, 200)
            )),
        }
    }
}

/// Ways the chat-completion service can fail
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChatFailure {
    /// The service answered with a non-success status
    #[error("chat service error (status {status}): {body}")]
    Service { status: u16, body: String },

    /// The service answered but the reply text was empty or missing
    #[error("chat service returned an empty reply")]
    EmptyReply,

    /// The request exceeded its time bound
    #[error("chat request timed out")]
    Timeout,

    /// The service could not be reached
    #[error("chat network failure")]
    Network,

    /// The response body did not parse
    #[error("malformed chat response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ChatFailure {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatFailure::Timeout
        } else if err.is_connect() || err.is_request() {
            ChatFailure::Network
        } else if err.is_decode() {
            ChatFailure::Malformed(err.to_string())
        } else {
            ChatFailure::Network
        }
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
