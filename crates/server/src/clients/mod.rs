//! Remote capability clients
//!
//! The chat-completion and speech services are consumed through trait seams
//! so handlers can be exercised against doubles. Capabilities are built once
//! at startup; a missing or malformed credential yields a typed unavailable
//! capability instead of a crash or a nullable global.

pub mod elevenlabs;
pub mod failure;
pub mod gemini;

pub use elevenlabs::ElevenLabsSpeech;
pub use failure::{ChatFailure, SpeechFailure};
pub use gemini::GeminiChat;

use crate::config::ServerConfig;
use async_trait::async_trait;
use hermes_protocol::Turn;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Minimum plausible credential length; anything shorter is treated as
/// malformed and leaves the capability unavailable
const MIN_KEY_LEN: usize = 10;

/// An audio clip as received from the client, consumed once by transcription
#[derive(Clone, Debug)]
pub struct AudioClip {
    pub bytes: Vec<u8>,
    pub mime: String,
}

impl AudioClip {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Chat-completion capability: ordered turns in, generated text out
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn generate(&self, turns: &[Turn]) -> Result<String, ChatFailure>;
}

/// Speech capability: transcription and synthesis
#[async_trait]
pub trait SpeechService: Send + Sync {
    /// Transcribe an audio clip to text
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, SpeechFailure>;

    /// Synthesize speech for the given text, returning encoded audio bytes
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechFailure>;
}

/// A remote capability that either initialized or did not
///
/// Initialization failure is permanent for the process lifetime; every
/// request needing the capability sees the same unavailable state.
pub enum Capability<T: ?Sized> {
    Ready(Arc<T>),
    Unavailable { reason: &'static str },
}

impl<T: ?Sized> Clone for Capability<T> {
    fn clone(&self) -> Self {
        match self {
            Capability::Ready(client) => Capability::Ready(Arc::clone(client)),
            Capability::Unavailable { reason } => Capability::Unavailable { reason },
        }
    }
}

impl<T: ?Sized> Capability<T> {
    pub fn is_ready(&self) -> bool {
        matches!(self, Capability::Ready(_))
    }

    /// The client, if the capability initialized
    pub fn get(&self) -> Option<&Arc<T>> {
        match self {
            Capability::Ready(client) => Some(client),
            Capability::Unavailable { .. } => None,
        }
    }

    /// Why the capability is unavailable, if it is
    pub fn unavailable_reason(&self) -> Option<&'static str> {
        match self {
            Capability::Ready(_) => None,
            Capability::Unavailable { reason } => Some(reason),
        }
    }
}

/// Everything the request handlers need, built once at startup
#[derive(Clone)]
pub struct AppContext {
    pub chat: Capability<dyn ChatModel>,
    pub speech: Capability<dyn SpeechService>,
    pub intro_audio: String,
    pub fallback_audio: String,
    pub started_at: Instant,
}

impl AppContext {
    /// Build the context from configuration, initializing each capability
    pub fn from_config(config: &ServerConfig) -> Self {
        let chat: Capability<dyn ChatModel> = match credential(&config.chat.api_key) {
            Ok(key) => {
                info!("chat-completion capability initialized");
                Capability::Ready(Arc::new(GeminiChat::new(&config.chat, key)))
            }
            Err(reason) => {
                warn!(reason, "chat-completion capability unavailable");
                Capability::Unavailable { reason }
            }
        };

        let speech: Capability<dyn SpeechService> = match credential(&config.speech.api_key) {
            Ok(key) => {
                info!(voice = %config.speech.voice_id, "speech capability initialized");
                Capability::Ready(Arc::new(ElevenLabsSpeech::new(&config.speech, key)))
            }
            Err(reason) => {
                warn!(reason, "speech capability unavailable");
                Capability::Unavailable { reason }
            }
        };

        Self {
            chat,
            speech,
            intro_audio: config.assets.intro_audio.clone(),
            fallback_audio: config.assets.fallback_audio.clone(),
            started_at: Instant::now(),
        }
    }

    /// Build a context directly from capability instances
    ///
    /// Used by tests to wire in doubles.
    pub fn with_capabilities(
        chat: Capability<dyn ChatModel>,
        speech: Capability<dyn SpeechService>,
    ) -> Self {
        Self {
            chat,
            speech,
            intro_audio: "/audio/hermes-intro.mp3".to_string(),
            fallback_audio: "/audio/hermes-fallback.mp3".to_string(),
            started_at: Instant::now(),
        }
    }
}

/// Check a configured credential, rejecting absent or implausibly short keys
fn credential(key: &Option<String>) -> Result<String, &'static str> {
    match key {
        None => Err("credential not configured"),
        Some(key) if key.len() < MIN_KEY_LEN => Err("credential malformed"),
        Some(key) => Ok(key.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_credential_leaves_capability_unavailable() {
        let config = ServerConfig::default();
        let ctx = AppContext::from_config(&config);
        assert!(!ctx.chat.is_ready());
        assert!(!ctx.speech.is_ready());
        assert_eq!(
            ctx.chat.unavailable_reason(),
            Some("credential not configured")
        );
    }

    #[test]
    fn test_short_credential_is_malformed() {
        let config = ServerConfig::default().with_chat_key("short");
        let ctx = AppContext::from_config(&config);
        assert_eq!(ctx.chat.unavailable_reason(), Some("credential malformed"));
    }

    #[test]
    fn test_configured_credentials_initialize() {
        let config = ServerConfig::default()
            .with_chat_key("chat-key-0123456789")
            .with_speech_key("speech-key-0123456789");
        let ctx = AppContext::from_config(&config);
        assert!(ctx.chat.is_ready());
        assert!(ctx.speech.is_ready());
    }

    #[test]
    fn test_audio_clip_accessors() {
        let clip = AudioClip::new(vec![1, 2, 3], "audio/wav");
        assert_eq!(clip.len(), 3);
        assert!(!clip.is_empty());

        let empty = AudioClip::new(Vec::new(), "audio/wav");
        assert!(empty.is_empty());
    }
}
