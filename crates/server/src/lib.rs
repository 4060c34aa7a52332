//! Hermes server - conversational assistant backend
//!
//! Hosts the two conversation endpoints (text chat and voice chat) and the
//! clients for the remote chat-completion and speech capabilities. Handlers
//! are stateless; conversation history arrives with each request.

pub mod api;
pub mod clients;
pub mod config;
pub mod error;
pub mod health;
pub mod persona;

pub use clients::{AppContext, AudioClip, Capability, ChatModel, SpeechService};
pub use config::ServerConfig;
pub use error::{ApiError, ApiResult};
