//! Server configuration
//!
//! Settings come from the environment (with `.env` support in the binary).
//! Missing credentials are not an error here: they surface later as an
//! unavailable capability so the server can still run degraded.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Default request timeout for every remote capability call
pub const REMOTE_TIMEOUT: Duration = Duration::from_secs(30);

/// Top-level server configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub chat: ChatConfig,
    pub speech: SpeechConfig,
    pub assets: AssetConfig,
}

/// Chat-completion capability settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChatConfig {
    /// API key; `None` leaves the capability unavailable
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Service base URL
    pub base_url: String,

    /// Model identifier
    pub model: String,

    /// Maximum tokens to generate per reply
    pub max_output_tokens: u32,

    /// Sampling temperature
    pub temperature: f32,
}

/// Speech capability settings (transcription + synthesis)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// API key; `None` leaves the capability unavailable
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Service base URL
    pub base_url: String,

    /// Voice used for synthesis
    pub voice_id: String,

    /// Transcription model identifier
    pub stt_model: String,

    /// Synthesis model identifier
    pub tts_model: String,
}

/// Pre-recorded audio assets served alongside canned messages
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Audio played with the first-contact intro message
    pub intro_audio: String,

    /// Audio played with the voice-fallback message
    pub fallback_audio: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            chat: ChatConfig {
                api_key: None,
                base_url: "https://generativelanguage.googleapis.com".to_string(),
                model: "gemini-2.0-flash-exp".to_string(),
                max_output_tokens: 1000,
                temperature: 0.7,
            },
            speech: SpeechConfig {
                api_key: None,
                base_url: "https://api.elevenlabs.io".to_string(),
                voice_id: "21m00Tcm4TlvDq8ikWAM".to_string(),
                stt_model: "scribe_v1".to_string(),
                tts_model: "eleven_monolingual_v1".to_string(),
            },
            assets: AssetConfig {
                intro_audio: "/audio/hermes-intro.mp3".to_string(),
                fallback_audio: "/audio/hermes-fallback.mp3".to_string(),
            },
        }
    }
}

impl ServerConfig {
    /// Load configuration from the environment
    ///
    /// Recognized variables: `HOST`, `PORT`, `GEMINI_API_KEY`,
    /// `ELEVENLABS_API_KEY`, `ELEVENLABS_VOICE_ID`.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(host) = env::var("HOST") {
            config.host = host;
        }
        if let Ok(port) = env::var("PORT") {
            if let Ok(port) = port.parse() {
                config.port = port;
            }
        }
        config.chat.api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.is_empty());
        config.speech.api_key = env::var("ELEVENLABS_API_KEY")
            .ok()
            .filter(|k| !k.is_empty());
        if let Ok(voice) = env::var("ELEVENLABS_VOICE_ID") {
            if !voice.is_empty() {
                config.speech.voice_id = voice;
            }
        }

        config
    }

    /// Set the bind address
    pub fn with_bind(mut self, host: impl Into<String>, port: u16) -> Self {
        self.host = host.into();
        self.port = port;
        self
    }

    /// Set the chat-completion API key
    pub fn with_chat_key(mut self, key: impl Into<String>) -> Self {
        self.chat.api_key = Some(key.into());
        self
    }

    /// Set the speech API key
    pub fn with_speech_key(mut self, key: impl Into<String>) -> Self {
        self.speech.api_key = Some(key.into());
        self
    }

    /// Set the synthesis voice
    pub fn with_voice(mut self, voice_id: impl Into<String>) -> Self {
        self.speech.voice_id = voice_id.into();
        self
    }

    /// Check that the configuration is usable
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.port == 0 {
            anyhow::bail!("server port cannot be 0");
        }
        if self.host.is_empty() {
            anyhow::bail!("server host cannot be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = ServerConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.chat.api_key.is_none());
        assert!(config.speech.api_key.is_none());
    }

    #[test]
    fn test_validation_rejects_port_zero() {
        let config = ServerConfig::default().with_bind("127.0.0.1", 0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_builders() {
        let config = ServerConfig::default()
            .with_chat_key("chat-key-0123456789")
            .with_speech_key("speech-key-0123456789")
            .with_voice("custom-voice");

        assert_eq!(config.chat.api_key.as_deref(), Some("chat-key-0123456789"));
        assert_eq!(config.speech.voice_id, "custom-voice");
    }

    #[test]
    fn test_serialized_config_omits_keys() {
        let config = ServerConfig::default().with_chat_key("secret-key-value");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("secret-key-value"));
    }
}
