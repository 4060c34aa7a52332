//! The conversation controller
//!
//! Composes the session state machine, capture pipeline, energy gate,
//! playback guard, and conversation log, and drives them in response to
//! user actions, level ticks, playback completion, and server responses.
//! Hosts subscribe to [`ControllerEvent`]s and query [`SharedSession`]
//! for rendering.

use crate::capture::{CaptureMode, CaptureSession, MicrophonePort};
use crate::error::AgentError;
use crate::history::ConversationLog;
use crate::playback::{PlaybackGuard, SpeakerPort};
use crate::state::{SessionPhase, SharedSession};
use crate::transport::AssistantTransport;
use crate::vad::{EnergyGate, GateAction, VadConfig};
use crate::Result;
use crossbeam_channel::{unbounded, Receiver, Sender};
use hermes_protocol::limits::{MAX_AUDIO_BYTES, MAX_MESSAGE_CHARS};
use hermes_protocol::{Turn, VoiceChatResponse};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Notifications for the host UI
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControllerEvent {
    /// The session phase changed
    PhaseChanged(SessionPhase),
    /// The conversation log grew
    TurnAdded,
    /// The server flagged the voice service unavailable
    VoiceFallback,
    /// The conversation was cleared
    Cleared,
    /// Something went wrong; the message is user-presentable
    Error(String),
}

/// Client-side conversation controller
pub struct Conversation {
    transport: Arc<dyn AssistantTransport>,
    capture: CaptureSession,
    speaker: Box<dyn SpeakerPort>,
    playback: PlaybackGuard,
    gate: EnergyGate,
    state: SharedSession,
    log: ConversationLog,
    events: Sender<ControllerEvent>,
    clip_mime: String,
    panel_open: bool,
}

impl Conversation {
    /// Create a controller and the event stream the host subscribes to
    pub fn new(
        transport: Arc<dyn AssistantTransport>,
        mic: Box<dyn MicrophonePort>,
        speaker: Box<dyn SpeakerPort>,
        vad: VadConfig,
    ) -> (Self, Receiver<ControllerEvent>) {
        let (events, event_rx) = unbounded();

        let controller = Self {
            transport,
            capture: CaptureSession::new(mic),
            speaker,
            playback: PlaybackGuard::new(),
            gate: EnergyGate::new(vad),
            state: SharedSession::new(),
            log: ConversationLog::new(),
            events,
            clip_mime: "audio/webm".to_string(),
            panel_open: false,
        };

        (controller, event_rx)
    }

    /// Shared session state for host queries
    pub fn state(&self) -> &SharedSession {
        &self.state
    }

    /// The visible conversation so far
    pub fn log(&self) -> &ConversationLog {
        &self.log
    }

    /// The history payload the endpoints expect
    pub fn wire_history(&self) -> Vec<Turn> {
        self.log.wire_history()
    }

    // === Panel lifecycle ===

    /// Open the conversation panel; triggers the intro on first contact
    pub async fn open_panel(&mut self) {
        if self.panel_open {
            return;
        }
        self.panel_open = true;

        let wants_intro = {
            let state = self.state.read();
            !state.intro_played() && state.voice_available() && !state.text_selected()
        };
        if !wants_intro {
            return;
        }

        // Marked before the request so a slow server cannot double-trigger
        self.state.write().mark_intro_played();

        match self.transport.request_intro().await {
            Ok(resp) => {
                self.log
                    .push_assistant(resp.response.clone(), resp.audio_url.clone());
                self.emit(ControllerEvent::TurnAdded);
                if let Some(audio) = resp.audio_url.as_deref() {
                    self.play(audio);
                } else {
                    self.state.write().finish_processing();
                }
                self.phase_changed();
            }
            Err(e) => {
                warn!(%e, "intro request failed");
                self.emit(ControllerEvent::Error(e.to_string()));
            }
        }
    }

    /// Close the panel: stop capture and playback immediately
    ///
    /// An in-flight network request is not cancelled; its response is
    /// discarded by the sequence guard.
    pub fn close_panel(&mut self) {
        self.panel_open = false;
        self.capture.release();
        self.gate.reset();
        self.playback.stop(self.speaker.as_mut());
        {
            let mut state = self.state.write();
            state.end_continuous();
            state.cancel_listening();
            state.invalidate_inflight();
        }
        self.phase_changed();
    }

    // === Single-shot capture ===

    /// Start recording a single clip
    pub fn start_listening(&mut self) -> Result<()> {
        if !self.state.read().voice_available() {
            return Err(AgentError::VoiceUnavailable);
        }
        if !self.state.write().begin_listening() {
            return Err(AgentError::InvalidTransition(
                self.state.phase().to_string(),
            ));
        }

        if let Err(e) = self.capture.open(CaptureMode::SingleShot) {
            self.state.write().fail();
            self.phase_changed();
            self.emit(ControllerEvent::Error(e.to_string()));
            return Err(e);
        }

        self.capture.buffer.begin();
        self.phase_changed();
        Ok(())
    }

    /// Stop recording and submit the clip
    pub async fn stop_listening(&mut self) -> Result<()> {
        if !self.state.phase().is_listening() {
            return Err(AgentError::InvalidTransition(
                self.state.phase().to_string(),
            ));
        }

        let clip = self.capture.take_clip();
        self.capture.release();

        match clip {
            Some(clip) => self.submit_clip(clip).await,
            None => {
                self.state.write().cancel_listening();
                self.phase_changed();
                Err(AgentError::InvalidInput("no audio captured".to_string()))
            }
        }
    }

    /// Abandon the recording without submitting anything
    pub fn cancel_listening(&mut self) {
        self.capture.release();
        self.state.write().cancel_listening();
        self.phase_changed();
    }

    // === Continuous capture ===

    /// Open the stream and let the energy gate segment utterances
    pub fn start_continuous(&mut self) -> Result<()> {
        if !self.state.read().voice_available() {
            return Err(AgentError::VoiceUnavailable);
        }
        if !self.state.write().begin_continuous() {
            return Err(AgentError::InvalidTransition(
                self.state.phase().to_string(),
            ));
        }

        if let Err(e) = self.capture.open(CaptureMode::Continuous) {
            self.state.write().fail();
            self.phase_changed();
            self.emit(ControllerEvent::Error(e.to_string()));
            return Err(e);
        }

        self.gate.reset();
        self.phase_changed();
        Ok(())
    }

    /// Leave continuous mode, discarding any partial clip
    pub fn stop_continuous(&mut self) {
        self.capture.release();
        self.gate.reset();
        self.state.write().end_continuous();
        self.phase_changed();
    }

    /// Feed one encoded audio chunk from the open stream
    pub fn push_chunk(&mut self, chunk: &[u8]) {
        self.capture.buffer.push(chunk);
    }

    /// Feed one normalized level sample (one per animation frame)
    ///
    /// In continuous mode this drives the energy gate; a committed segment
    /// is submitted immediately.
    pub async fn level_tick(&mut self, level: f32, now: Instant) -> Result<()> {
        if !self.state.phase().is_continuous() {
            return Ok(());
        }

        match self.gate.process(level, now) {
            Some(GateAction::Begin) => {
                debug!("voice activity: capture begins");
                self.capture.buffer.begin();
                self.state.write().set_capturing(true);
                self.phase_changed();
                Ok(())
            }
            Some(GateAction::Commit) => {
                debug!("silence hold elapsed: committing clip");
                self.state.write().set_capturing(false);
                match self.capture.take_clip() {
                    Some(clip) => self.submit_clip(clip).await,
                    None => {
                        self.phase_changed();
                        Ok(())
                    }
                }
            }
            None => Ok(()),
        }
    }

    // === Text mode ===

    /// Switch to typed conversation
    pub fn enter_text_mode(&mut self) {
        self.capture.release();
        self.gate.reset();
        self.state.write().enter_text_mode();
        self.phase_changed();
    }

    /// Switch back to voice; rejected while the server-reported
    /// unavailability flag is set
    pub fn try_enable_voice(&mut self) -> Result<()> {
        if self.state.write().try_enable_voice() {
            self.phase_changed();
            Ok(())
        } else {
            Err(AgentError::VoiceUnavailable)
        }
    }

    /// Send a typed message
    pub async fn send_text(&mut self, message: &str) -> Result<()> {
        let trimmed = message.trim();
        if trimmed.is_empty() {
            return Err(AgentError::InvalidInput("message is empty".to_string()));
        }
        if trimmed.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AgentError::InvalidInput(format!(
                "message exceeds {} characters",
                MAX_MESSAGE_CHARS
            )));
        }

        let history = self.wire_history();
        let seq = self.state.write().begin_processing();
        self.phase_changed();

        let result = self.transport.send_text(trimmed, &history).await;

        if !self.state.read().is_current(seq) {
            debug!("discarding stale text response");
            return Ok(());
        }

        match result {
            Ok(resp) => {
                self.log.push_user(trimmed);
                self.log.push_assistant(resp.response, None);
                self.emit(ControllerEvent::TurnAdded);
                self.state.write().finish_processing();
                self.phase_changed();
                Ok(())
            }
            Err(e) => {
                self.state.write().finish_processing();
                self.phase_changed();
                self.emit(ControllerEvent::Error(e.to_string()));
                Err(e.into())
            }
        }
    }

    // === Playback ===

    /// The host finished playing the current reply audio
    pub fn playback_finished(&mut self) {
        self.playback.finished();
        self.state.write().finish_speaking();
        self.phase_changed();
    }

    // === Reset ===

    /// Clear the conversation: empty history, stop audio, back to idle,
    /// intro re-armed. Safe to call repeatedly.
    pub fn clear_conversation(&mut self) {
        self.log.clear();
        self.capture.release();
        self.gate.reset();
        self.playback.stop(self.speaker.as_mut());
        self.state.write().reset();
        self.emit(ControllerEvent::Cleared);
        self.phase_changed();
    }

    // === Internals ===

    /// Submit a recorded clip and apply the response unless it went stale
    async fn submit_clip(&mut self, clip: Vec<u8>) -> Result<()> {
        if clip.len() > MAX_AUDIO_BYTES {
            self.state.write().finish_processing();
            self.phase_changed();
            return Err(AgentError::InvalidInput(format!(
                "clip exceeds {} bytes",
                MAX_AUDIO_BYTES
            )));
        }

        let history = self.wire_history();
        let seq = self.state.write().begin_processing();
        self.phase_changed();

        let result = self
            .transport
            .send_voice(clip, &self.clip_mime, &history)
            .await;

        if !self.state.read().is_current(seq) {
            debug!("discarding stale voice response");
            return Ok(());
        }

        match result {
            Ok(resp) if resp.is_fallback() => {
                self.handle_voice_fallback(resp);
                Ok(())
            }
            Ok(resp) => {
                self.apply_exchange(resp);
                Ok(())
            }
            Err(e) => {
                self.state.write().finish_processing();
                self.phase_changed();
                self.emit(ControllerEvent::Error(e.to_string()));
                Err(e.into())
            }
        }
    }

    /// The server said the voice service is down: text mode for the rest
    /// of the session
    fn handle_voice_fallback(&mut self, resp: VoiceChatResponse) {
        warn!("voice service unavailable, switching to text mode");

        self.capture.release();
        self.gate.reset();
        self.state.write().voice_service_lost();

        self.log
            .push_assistant(resp.response.clone(), resp.audio_url.clone());
        self.emit(ControllerEvent::TurnAdded);
        self.emit(ControllerEvent::VoiceFallback);

        match resp.audio_url.as_deref() {
            Some(audio) => self.play(audio),
            None => self.state.write().enter_text_mode(),
        }
        self.phase_changed();
    }

    /// Record both sides of a completed exchange and play the reply
    fn apply_exchange(&mut self, resp: VoiceChatResponse) {
        self.log.push_user(resp.transcript.clone());
        self.log
            .push_assistant(resp.response.clone(), resp.audio_url.clone());
        self.emit(ControllerEvent::TurnAdded);

        match resp.audio_url.as_deref() {
            Some(audio) => self.play(audio),
            None => self.state.write().finish_processing(),
        }
        self.phase_changed();
    }

    /// Start playback, falling back to the resting phase if the speaker
    /// refuses
    fn play(&mut self, audio_ref: &str) {
        match self.playback.start(self.speaker.as_mut(), audio_ref) {
            Ok(()) => self.state.write().begin_speaking(),
            Err(e) => {
                warn!(%e, "playback failed, continuing without audio");
                self.emit(ControllerEvent::Error(e.to_string()));
                self.state.write().finish_speaking();
            }
        }
    }

    fn phase_changed(&self) {
        self.emit(ControllerEvent::PhaseChanged(self.state.phase()));
    }

    fn emit(&self, event: ControllerEvent) {
        let _ = self.events.send(event);
    }
}
