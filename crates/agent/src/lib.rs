//! Hermes agent - client-side conversation controller
//!
//! Owns the conversational session state machine: capture (single-shot and
//! voice-activity-gated continuous), playback of synthesized replies,
//! text-mode fallback, and the visible history sent with each request.
//! Microphone and speaker hardware sit behind port traits; the two server
//! endpoints sit behind a transport trait.

pub mod capture;
pub mod controller;
pub mod error;
pub mod history;
pub mod playback;
pub mod state;
pub mod transport;
pub mod vad;

pub use controller::{Conversation, ControllerEvent};
pub use error::AgentError;
pub use history::{ConversationLog, ConversationTurn, Speaker};
pub use state::{SessionPhase, SessionState, SharedSession};
pub use transport::{AssistantTransport, HttpTransport, TransportError};
pub use vad::{EnergyGate, GateAction, VadConfig};

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;
