//! Voice conversation handler
//!
//! Transcribes the uploaded clip, generates a reply, and synthesizes it
//! back to audio. Transcription failure of any kind becomes the canned
//! voice-fallback response (still 200) that tells the client to switch to
//! text mode; synthesis is best-effort and never fails the request.

use crate::api::{ok_json, text_chat::generate_reply};
use crate::clients::{AppContext, AudioClip, SpeechFailure};
use crate::error::ApiError;
use crate::persona;
use actix_multipart::Multipart;
use actix_web::{web, HttpResponse};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use futures_util::StreamExt;
use hermes_protocol::limits::MAX_AUDIO_BYTES;
use hermes_protocol::{Turn, VoiceChatResponse, VOICE_SERVICE_UNAVAILABLE};
use tracing::{debug, error, warn};

/// Fields accepted by the voice endpoint
#[derive(Default)]
struct VoiceForm {
    audio: Option<AudioClip>,
    intro: bool,
    history: Vec<Turn>,
}

/// `POST /api/voice-chat`
pub async fn voice_chat(
    ctx: web::Data<AppContext>,
    payload: Multipart,
) -> Result<HttpResponse, ApiError> {
    let form = read_form(payload).await?;

    // First contact: canned intro, no audio required
    if form.intro {
        debug!("returning intro response");
        return Ok(intro_response(&ctx));
    }

    let clip = form.audio.ok_or_else(|| {
        ApiError::invalid("No audio file provided", "Please record audio and try again.")
    })?;
    if clip.is_empty() {
        return Err(ApiError::invalid(
            "Empty audio file",
            "Please record some audio and try again.",
        ));
    }
    if clip.len() > MAX_AUDIO_BYTES {
        return Err(ApiError::invalid(
            "Audio file too large",
            "Please record a shorter audio clip (max 10MB).",
        ));
    }

    if !ctx.chat.is_ready() {
        return Err(ApiError::misconfigured(
            "AI service not available - configuration missing",
            "The AI service is not properly configured. Please contact support.",
        ));
    }

    // Past this point the client never sees an error status: anything
    // unexpected degrades to the voice-fallback body.
    match run_exchange(&ctx, clip, &form.history).await {
        Ok(response) => Ok(response),
        Err(err) => {
            error!(%err, "unexpected failure in voice exchange, returning fallback");
            Ok(fallback_response(&ctx))
        }
    }
}

/// Transcribe, generate, synthesize
async fn run_exchange(
    ctx: &AppContext,
    clip: AudioClip,
    history: &[Turn],
) -> Result<HttpResponse, ApiError> {
    let Some(speech) = ctx.speech.get() else {
        warn!(failure = %SpeechFailure::MissingCredential, "returning fallback");
        return Ok(fallback_response(ctx));
    };

    let transcript = match speech.transcribe(&clip).await {
        Ok(text) => text,
        Err(failure) => {
            warn!(%failure, "transcription failed, returning fallback");
            return Ok(fallback_response(ctx));
        }
    };
    debug!(chars = transcript.chars().count(), "transcription complete");

    let chat = ctx.chat.get().ok_or_else(|| {
        ApiError::Internal("chat capability lost after readiness check".to_string())
    })?;
    let response = generate_reply(chat.as_ref(), history, &transcript).await;

    let audio_url = match speech.synthesize(&response).await {
        Ok(bytes) => Some(format!("data:audio/mpeg;base64,{}", BASE64.encode(&bytes))),
        Err(failure) => {
            warn!(%failure, "synthesis failed, returning text-only reply");
            None
        }
    };

    Ok(ok_json(&VoiceChatResponse {
        transcript,
        response,
        audio_url,
        is_intro_message: None,
        is_voice_fallback: None,
        error_type: None,
        timestamp: Utc::now(),
    }))
}

/// Canned first-contact response with its pre-recorded audio
fn intro_response(ctx: &AppContext) -> HttpResponse {
    ok_json(&VoiceChatResponse {
        transcript: persona::INTRO_TRANSCRIPT.to_string(),
        response: persona::INTRO_MESSAGE.to_string(),
        audio_url: Some(ctx.intro_audio.clone()),
        is_intro_message: Some(true),
        is_voice_fallback: None,
        error_type: None,
        timestamp: Utc::now(),
    })
}

/// Canned voice-fallback response instructing the client to use text mode
fn fallback_response(ctx: &AppContext) -> HttpResponse {
    ok_json(&VoiceChatResponse {
        transcript: persona::FALLBACK_TRANSCRIPT.to_string(),
        response: persona::FALLBACK_MESSAGE.to_string(),
        audio_url: Some(ctx.fallback_audio.clone()),
        is_intro_message: None,
        is_voice_fallback: Some(true),
        error_type: Some(VOICE_SERVICE_UNAVAILABLE.to_string()),
        timestamp: Utc::now(),
    })
}

/// Collect the multipart fields, tolerating unknown ones
async fn read_form(mut payload: Multipart) -> Result<VoiceForm, ApiError> {
    let mut form = VoiceForm::default();

    while let Some(item) = payload.next().await {
        let mut field = item.map_err(|e| {
            warn!(%e, "multipart parse failure");
            ApiError::invalid(
                "Invalid request format",
                "Please ensure you're sending valid form data with an audio file.",
            )
        })?;

        let Some(name) = field
            .content_disposition()
            .and_then(|cd| cd.get_name())
            .map(str::to_string)
        else {
            continue;
        };
        let mime = field
            .content_type()
            .map(|m| m.to_string())
            .unwrap_or_else(|| "audio/wav".to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.next().await {
            let chunk = chunk.map_err(|e| {
                warn!(%e, field = %name, "multipart chunk failure");
                ApiError::invalid(
                    "Invalid request format",
                    "Please ensure you're sending valid form data with an audio file.",
                )
            })?;
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "audio" => form.audio = Some(AudioClip::new(bytes, mime)),
            "intro" => form.intro = String::from_utf8_lossy(&bytes).trim() == "true",
            "history" => {
                // A history that does not parse is ignored, not fatal
                match serde_json::from_slice::<Vec<Turn>>(&bytes) {
                    Ok(history) => form.history = history,
                    Err(e) => warn!(%e, "could not parse conversation history, continuing without it"),
                }
            }
            _ => {}
        }
    }

    Ok(form)
}
