//! Microphone capture: modes, clip buffering, stream ownership
//!
//! The microphone hardware lives behind [`MicrophonePort`]; the host pushes
//! encoded audio chunks into the controller while capture is active. The
//! session guarantees at most one open stream: single-shot and continuous
//! mode are mutually exclusive, and switching or closing releases the
//! stream explicitly.

use crate::error::AgentError;
use crate::Result;

/// How the microphone is being used
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CaptureMode {
    /// Start and stop on explicit user action
    SingleShot,
    /// Open stream with voice-activity-gated buffering
    Continuous,
}

/// Seam to the recording hardware
///
/// `open` corresponds to acquiring the input stream (and may be refused by
/// the user); `close` must release the underlying tracks.
pub trait MicrophonePort: Send {
    fn open(&mut self) -> Result<()>;
    fn close(&mut self);
}

/// Accumulates the encoded chunks of one clip
#[derive(Clone, Debug, Default)]
pub struct ClipBuffer {
    bytes: Vec<u8>,
    active: bool,
}

impl ClipBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh clip, discarding any previous content
    pub fn begin(&mut self) {
        self.bytes.clear();
        self.active = true;
    }

    /// Append a chunk; ignored unless a clip is being accumulated
    pub fn push(&mut self, chunk: &[u8]) {
        if self.active {
            self.bytes.extend_from_slice(chunk);
        }
    }

    /// Finish the clip and hand back its bytes; `None` if nothing was
    /// accumulated
    pub fn commit(&mut self) -> Option<Vec<u8>> {
        self.active = false;
        if self.bytes.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.bytes))
        }
    }

    /// Throw the clip away
    pub fn discard(&mut self) {
        self.active = false;
        self.bytes.clear();
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Exclusive ownership of the microphone stream
pub struct CaptureSession {
    mic: Box<dyn MicrophonePort>,
    mode: Option<CaptureMode>,
    pub buffer: ClipBuffer,
}

impl CaptureSession {
    pub fn new(mic: Box<dyn MicrophonePort>) -> Self {
        Self {
            mic,
            mode: None,
            buffer: ClipBuffer::new(),
        }
    }

    pub fn mode(&self) -> Option<CaptureMode> {
        self.mode
    }

    pub fn is_open(&self) -> bool {
        self.mode.is_some()
    }

    /// Acquire the stream for the given mode
    ///
    /// A stream already open in another mode is released first so only one
    /// is ever live.
    pub fn open(&mut self, mode: CaptureMode) -> Result<()> {
        if let Some(current) = self.mode {
            if current == mode {
                return Ok(());
            }
            self.release();
        }

        self.mic
            .open()
            .map_err(|e| AgentError::Microphone(e.to_string()))?;
        self.mode = Some(mode);
        Ok(())
    }

    /// Release the stream and discard any partial clip
    pub fn release(&mut self) {
        if self.mode.take().is_some() {
            self.mic.close();
        }
        self.buffer.discard();
    }

    /// Stop accumulating and take the clip for submission
    pub fn take_clip(&mut self) -> Option<Vec<u8>> {
        self.buffer.commit()
    }
}
