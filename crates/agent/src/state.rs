//! Session state machine for the conversation controller
//!
//! A single tagged phase replaces the pile of booleans a UI tends to grow
//! (`isRecording`, `isTextMode`, `isContinuousMode`, ...). Contradictory
//! combinations are unrepresentable; the only orthogonal flags kept beside
//! the phase are session-scoped facts, not modes.

use parking_lot::RwLock;
use std::fmt;
use std::sync::Arc;

/// The one active phase of the voice session
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionPhase {
    /// Nothing in flight
    #[default]
    Idle,
    /// Single-shot recording in progress
    Listening,
    /// Open stream, capture gated by voice activity
    ContinuousListening {
        /// Whether the gate currently has a clip buffering
        capturing: bool,
    },
    /// Awaiting a server response; `seq` identifies the request so stale
    /// responses can be discarded
    Processing { seq: u64 },
    /// Playing a synthesized reply
    Speaking,
    /// Typed conversation only; capture controls disabled
    TextMode,
    /// Capture permission denied or another unrecoverable device problem
    Error,
}

impl SessionPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, SessionPhase::Idle)
    }

    pub fn is_listening(&self) -> bool {
        matches!(self, SessionPhase::Listening)
    }

    pub fn is_continuous(&self) -> bool {
        matches!(self, SessionPhase::ContinuousListening { .. })
    }

    /// Whether a clip is being accumulated right now, in either mode
    pub fn is_capturing(&self) -> bool {
        matches!(
            self,
            SessionPhase::Listening | SessionPhase::ContinuousListening { capturing: true }
        )
    }

    pub fn is_processing(&self) -> bool {
        matches!(self, SessionPhase::Processing { .. })
    }

    pub fn is_speaking(&self) -> bool {
        matches!(self, SessionPhase::Speaking)
    }

    pub fn is_text_mode(&self) -> bool {
        matches!(self, SessionPhase::TextMode)
    }

    pub fn is_error(&self) -> bool {
        matches!(self, SessionPhase::Error)
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionPhase::Idle => write!(f, "idle"),
            SessionPhase::Listening => write!(f, "listening"),
            SessionPhase::ContinuousListening { capturing: true } => {
                write!(f, "continuous-listening (capturing)")
            }
            SessionPhase::ContinuousListening { capturing: false } => {
                write!(f, "continuous-listening")
            }
            SessionPhase::Processing { .. } => write!(f, "processing"),
            SessionPhase::Speaking => write!(f, "speaking"),
            SessionPhase::TextMode => write!(f, "text-mode"),
            SessionPhase::Error => write!(f, "error"),
        }
    }
}

/// Full session state: the phase plus session-scoped facts
#[derive(Clone, Debug)]
pub struct SessionState {
    phase: SessionPhase,

    /// Continuous mode stays selected across processing and playback so the
    /// session returns to it when the exchange finishes
    continuous: bool,

    /// Typed-conversation preference; survives the processing phase so a
    /// text exchange returns to text mode, not idle
    text_selected: bool,

    /// Cleared when the server reports the voice service unavailable;
    /// never set again within the session
    voice_available: bool,

    /// Whether the first-contact intro has been delivered
    intro_played: bool,

    /// Next request sequence number
    next_seq: u64,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            phase: SessionPhase::Idle,
            continuous: false,
            text_selected: false,
            voice_available: true,
            intro_played: false,
            next_seq: 1,
        }
    }
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn continuous_selected(&self) -> bool {
        self.continuous
    }

    pub fn text_selected(&self) -> bool {
        self.text_selected
    }

    pub fn voice_available(&self) -> bool {
        self.voice_available
    }

    pub fn intro_played(&self) -> bool {
        self.intro_played
    }

    pub fn mark_intro_played(&mut self) {
        self.intro_played = true;
    }

    // === Capture transitions ===

    /// Start a single-shot recording; only legal from idle with voice up
    pub fn begin_listening(&mut self) -> bool {
        if self.voice_available && self.phase.is_idle() {
            self.phase = SessionPhase::Listening;
            true
        } else {
            false
        }
    }

    /// Enter continuous mode; only legal from idle with voice up
    pub fn begin_continuous(&mut self) -> bool {
        if self.voice_available && self.phase.is_idle() {
            self.continuous = true;
            self.phase = SessionPhase::ContinuousListening { capturing: false };
            true
        } else {
            false
        }
    }

    /// Update the gate-capture flag while in continuous mode
    pub fn set_capturing(&mut self, capturing: bool) {
        if self.phase.is_continuous() {
            self.phase = SessionPhase::ContinuousListening { capturing };
        }
    }

    /// Leave continuous mode and return to idle
    pub fn end_continuous(&mut self) {
        self.continuous = false;
        if self.phase.is_continuous() {
            self.phase = SessionPhase::Idle;
        }
    }

    /// Abandon an in-progress single-shot recording
    pub fn cancel_listening(&mut self) {
        if self.phase.is_listening() {
            self.phase = SessionPhase::Idle;
        }
    }

    // === Request lifecycle ===

    /// Move to processing and allocate the sequence number guarding this
    /// request against stale application
    pub fn begin_processing(&mut self) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.phase = SessionPhase::Processing { seq };
        seq
    }

    /// Whether a response for `seq` is still the one being awaited
    pub fn is_current(&self, seq: u64) -> bool {
        self.phase == SessionPhase::Processing { seq }
    }

    /// Invalidate any in-flight request so its response is discarded
    pub fn invalidate_inflight(&mut self) {
        self.next_seq += 1;
        if self.phase.is_processing() {
            self.phase = self.rest_phase();
        }
    }

    // === Playback ===

    pub fn begin_speaking(&mut self) {
        self.phase = SessionPhase::Speaking;
    }

    /// Route back to the resting phase when playback ends
    pub fn finish_speaking(&mut self) {
        self.phase = self.rest_phase();
    }

    /// Route back to the resting phase when an exchange produced no audio
    pub fn finish_processing(&mut self) {
        self.phase = self.rest_phase();
    }

    // === Mode changes ===

    /// Record the server's voice-unavailable signal; permanent for the
    /// session and implies text mode
    pub fn voice_service_lost(&mut self) {
        self.voice_available = false;
        self.continuous = false;
        self.text_selected = true;
    }

    /// Switch to typed conversation
    pub fn enter_text_mode(&mut self) {
        self.continuous = false;
        self.text_selected = true;
        self.phase = SessionPhase::TextMode;
    }

    /// Attempt to switch back to voice; rejected while the server-reported
    /// unavailability flag is set
    pub fn try_enable_voice(&mut self) -> bool {
        if self.voice_available {
            self.text_selected = false;
            self.phase = SessionPhase::Idle;
            true
        } else {
            false
        }
    }

    /// Enter the error phase (capture permission denied and similar)
    pub fn fail(&mut self) {
        self.continuous = false;
        self.phase = SessionPhase::Error;
    }

    /// Reset for a fresh conversation; idempotent
    pub fn reset(&mut self) {
        self.next_seq += 1;
        self.continuous = false;
        self.intro_played = false;
        self.text_selected = !self.voice_available;
        self.phase = if self.voice_available {
            SessionPhase::Idle
        } else {
            SessionPhase::TextMode
        };
    }

    /// The phase the session rests in when nothing is in flight
    fn rest_phase(&self) -> SessionPhase {
        if !self.voice_available || self.text_selected {
            SessionPhase::TextMode
        } else if self.continuous {
            SessionPhase::ContinuousListening { capturing: false }
        } else {
            SessionPhase::Idle
        }
    }
}

/// Thread-safe shared session state for host UIs to query
#[derive(Clone, Default)]
pub struct SharedSession {
    inner: Arc<RwLock<SessionState>>,
}

impl SharedSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read(&self) -> parking_lot::RwLockReadGuard<'_, SessionState> {
        self.inner.read()
    }

    pub fn write(&self) -> parking_lot::RwLockWriteGuard<'_, SessionState> {
        self.inner.write()
    }

    pub fn phase(&self) -> SessionPhase {
        self.inner.read().phase()
    }

    pub fn is_idle(&self) -> bool {
        self.phase().is_idle()
    }

    pub fn is_capturing(&self) -> bool {
        self.phase().is_capturing()
    }

    pub fn voice_available(&self) -> bool {
        self.inner.read().voice_available()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_shot_cycle() {
        let mut state = SessionState::new();
        assert!(state.begin_listening());
        assert!(state.phase().is_listening());

        let seq = state.begin_processing();
        assert!(state.is_current(seq));

        state.begin_speaking();
        assert!(state.phase().is_speaking());

        state.finish_speaking();
        assert!(state.phase().is_idle());
    }

    #[test]
    fn test_continuous_cycle_returns_to_continuous() {
        let mut state = SessionState::new();
        assert!(state.begin_continuous());
        state.set_capturing(true);
        assert!(state.phase().is_capturing());

        let _seq = state.begin_processing();
        state.begin_speaking();
        state.finish_speaking();

        assert_eq!(
            state.phase(),
            SessionPhase::ContinuousListening { capturing: false }
        );
    }

    #[test]
    fn test_listening_requires_idle() {
        let mut state = SessionState::new();
        state.begin_processing();
        assert!(!state.begin_listening());
        assert!(!state.begin_continuous());
    }

    #[test]
    fn test_stale_seq_not_current() {
        let mut state = SessionState::new();
        let first = state.begin_processing();
        let second = state.begin_processing();
        assert!(!state.is_current(first));
        assert!(state.is_current(second));
    }

    #[test]
    fn test_invalidate_discards_inflight() {
        let mut state = SessionState::new();
        let seq = state.begin_processing();
        state.invalidate_inflight();
        assert!(!state.is_current(seq));
        assert!(state.phase().is_idle());
    }

    #[test]
    fn test_voice_loss_forces_text_mode_rest() {
        let mut state = SessionState::new();
        state.begin_continuous();
        let _ = state.begin_processing();

        state.voice_service_lost();
        state.finish_processing();

        assert!(state.phase().is_text_mode());
        assert!(!state.continuous_selected());
        assert!(!state.try_enable_voice());
        assert!(state.phase().is_text_mode());
    }

    #[test]
    fn test_text_mode_toggle_round_trip() {
        let mut state = SessionState::new();
        state.enter_text_mode();
        assert!(state.phase().is_text_mode());
        assert!(state.try_enable_voice());
        assert!(state.phase().is_idle());
    }

    #[test]
    fn test_text_exchange_returns_to_text_mode() {
        let mut state = SessionState::new();
        state.enter_text_mode();
        let _ = state.begin_processing();
        state.finish_processing();
        assert!(state.phase().is_text_mode());
        assert!(state.text_selected());
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut state = SessionState::new();
        state.mark_intro_played();
        state.begin_continuous();
        let _ = state.begin_processing();

        state.reset();
        let after_once = (state.phase(), state.intro_played(), state.continuous_selected());

        state.reset();
        let after_twice = (state.phase(), state.intro_played(), state.continuous_selected());

        assert_eq!(after_once, after_twice);
        assert!(state.phase().is_idle());
        assert!(!state.intro_played());
    }

    #[test]
    fn test_reset_keeps_voice_unavailability() {
        let mut state = SessionState::new();
        state.voice_service_lost();
        state.reset();
        assert!(state.phase().is_text_mode());
        assert!(!state.voice_available());
    }

    #[test]
    fn test_error_phase() {
        let mut state = SessionState::new();
        state.begin_listening();
        state.fail();
        assert!(state.phase().is_error());
    }

    #[test]
    fn test_shared_session_queries() {
        let shared = SharedSession::new();
        assert!(shared.is_idle());
        shared.write().begin_listening();
        assert!(shared.is_capturing());
    }
}
