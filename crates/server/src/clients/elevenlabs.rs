//! Speech client: transcription and synthesis

use crate::clients::failure::SpeechFailure;
use crate::clients::{AudioClip, SpeechService};
use crate::config::{SpeechConfig, REMOTE_TIMEOUT};
use async_trait::async_trait;
use hermes_protocol::limits::MAX_SPEECH_CHARS;
use reqwest::multipart::{Form, Part};
use serde_json::json;
use tracing::debug;

/// Client for the ElevenLabs speech-to-text and text-to-speech endpoints
pub struct ElevenLabsSpeech {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    stt_model: String,
    tts_model: String,
}

impl ElevenLabsSpeech {
    /// Create a client from configuration plus the verified credential
    pub fn new(config: &SpeechConfig, api_key: String) -> Self {
        let http = reqwest::Client::builder()
            .timeout(REMOTE_TIMEOUT)
            .build()
            .unwrap_or_default();

        Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key,
            voice_id: config.voice_id.clone(),
            stt_model: config.stt_model.clone(),
            tts_model: config.tts_model.clone(),
        }
    }

    /// The transcript may arrive under different field names depending on
    /// the model used
    fn extract_transcript(body: &serde_json::Value) -> Option<&str> {
        ["text", "transcript", "transcription"]
            .iter()
            .find_map(|field| body.get(field).and_then(|v| v.as_str()))
    }
}

#[async_trait]
impl SpeechService for ElevenLabsSpeech {
    async fn transcribe(&self, clip: &AudioClip) -> Result<String, SpeechFailure> {
        let file = Part::bytes(clip.bytes.clone())
            .file_name("audio.wav")
            .mime_str(&clip.mime)
            .map_err(|e| SpeechFailure::Unrecognized(format!("clip mime rejected: {}", e)))?;

        let form = Form::new()
            .part("file", file)
            .text("model_id", self.stt_model.clone());

        debug!(bytes = clip.len(), mime = %clip.mime, "submitting clip for transcription");

        let response = self
            .http
            .post(format!("{}/v1/speech-to-text", self.base_url))
            .header("xi-api-key", &self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SpeechFailure::classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechFailure::classify_response(status.as_u16(), &body));
        }

        let body: serde_json::Value = response
            .json()
            .await
            .map_err(|e| SpeechFailure::Unrecognized(format!("malformed transcript: {}", e)))?;

        match Self::extract_transcript(&body) {
            Some(text) if !text.trim().is_empty() => Ok(text.trim().to_string()),
            _ => Err(SpeechFailure::EmptyTranscript),
        }
    }

    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, SpeechFailure> {
        let text = truncate_chars(text, MAX_SPEECH_CHARS);

        let request = json!({
            "text": text,
            "model_id": self.tts_model,
            "voice_settings": {
                "stability": 0.5,
                "similarity_boost": 0.5,
                "style": 0.0,
                "use_speaker_boost": true,
            },
        });

        debug!(chars = text.chars().count(), voice = %self.voice_id, "requesting synthesis");

        let response = self
            .http
            .post(format!(
                "{}/v1/text-to-speech/{}",
                self.base_url, self.voice_id
            ))
            .header("xi-api-key", &self.api_key)
            .header("Accept", "audio/mpeg")
            .json(&request)
            .send()
            .await
            .map_err(|e| SpeechFailure::classify_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechFailure::classify_response(status.as_u16(), &body));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| SpeechFailure::classify_transport(&e))?;

        if audio.is_empty() {
            return Err(SpeechFailure::EmptyAudio);
        }

        Ok(audio.to_vec())
    }
}

/// Truncate to at most `max` characters, respecting char boundaries
fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
