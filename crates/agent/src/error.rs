//! Error types for the conversation controller

use crate::transport::TransportError;
use thiserror::Error;

/// Controller errors
#[derive(Debug, Error)]
pub enum AgentError {
    /// Microphone could not be opened or failed mid-capture
    #[error("microphone error: {0}")]
    Microphone(String),

    /// Speaker playback failed
    #[error("playback error: {0}")]
    Playback(String),

    /// A request to the assistant endpoints failed
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Input rejected before any request was made
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The requested action is not legal in the current phase
    #[error("action not allowed while {0}")]
    InvalidTransition(String),

    /// Voice mode was requested while the voice service is flagged unavailable
    #[error("voice service unavailable for this session")]
    VoiceUnavailable,
}

impl AgentError {
    /// Whether the session can continue after this error
    pub fn is_recoverable(&self) -> bool {
        match self {
            // Permission or device problems need user intervention
            AgentError::Microphone(_) => false,
            // Playback failure just skips the audio
            AgentError::Playback(_) => true,
            // Network problems are typically transient
            AgentError::Transport(_) => true,
            AgentError::InvalidInput(_) => true,
            AgentError::InvalidTransition(_) => true,
            // Cleared only by the server changing its answer
            AgentError::VoiceUnavailable => false,
        }
    }
}
