//! Payload limits enforced by the server and checked client-side before upload

/// Maximum length of a text message, in characters
pub const MAX_MESSAGE_CHARS: usize = 2000;

/// Maximum size of an uploaded audio clip, in bytes
pub const MAX_AUDIO_BYTES: usize = 10 * 1024 * 1024;

/// Maximum length of text submitted for speech synthesis, in characters
pub const MAX_SPEECH_CHARS: usize = 500;
