//! Request and response bodies for the conversation endpoints
//!
//! Every response body carries an RFC-3339 `timestamp`; both endpoints
//! answer JSON on every path, success or error.

use crate::turn::Turn;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Machine-readable error type for voice-service degradation
pub const VOICE_SERVICE_UNAVAILABLE: &str = "voice_service_unavailable";

/// Body of `POST /api/text-chat`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextChatRequest {
    /// The new user message
    pub message: String,

    /// Prior visible dialogue, oldest first, without server seed turns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<Vec<Turn>>,
}

/// Success body of the text endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TextChatResponse {
    pub response: String,
    pub timestamp: DateTime<Utc>,
}

/// Success body of the voice endpoint
///
/// The same shape covers the normal reply, the canned intro, and the
/// voice-fallback; the optional flags distinguish them.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VoiceChatResponse {
    /// What the user was heard to say
    pub transcript: String,

    /// Assistant reply text
    pub response: String,

    /// Synthesized reply audio (data URL or asset path), if any
    #[serde(rename = "audioUrl")]
    pub audio_url: Option<String>,

    /// Set when this is the canned first-contact message
    #[serde(
        rename = "isIntroMessage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_intro_message: Option<bool>,

    /// Set when the speech service was judged unavailable and the client
    /// should switch to text mode
    #[serde(
        rename = "isVoiceFallback",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub is_voice_fallback: Option<bool>,

    /// Machine-readable failure category accompanying a fallback
    #[serde(rename = "errorType", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    pub timestamp: DateTime<Utc>,
}

impl VoiceChatResponse {
    /// Whether this response instructs the client to leave voice mode
    pub fn is_fallback(&self) -> bool {
        self.is_voice_fallback.unwrap_or(false)
    }

    /// Whether this is the canned intro
    pub fn is_intro(&self) -> bool {
        self.is_intro_message.unwrap_or(false)
    }
}

/// Error body returned with 400/500 statuses by either endpoint
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable description of what was wrong
    pub error: String,

    /// Machine-readable category
    #[serde(rename = "errorType", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// What the caller can do about it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,

    pub timestamp: DateTime<Utc>,
}
