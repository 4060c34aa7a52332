//! Hermes wire contract
//!
//! Shared types for the conversation endpoints: chat-service turns,
//! request/response bodies, and the payload limits both sides enforce.

pub mod limits;
pub mod messages;
pub mod turn;

pub use messages::{
    ApiErrorBody, TextChatRequest, TextChatResponse, VoiceChatResponse, VOICE_SERVICE_UNAVAILABLE,
};
pub use turn::{Turn, TurnPart, TurnRole};
