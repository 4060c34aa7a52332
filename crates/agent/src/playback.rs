//! Reply playback with a single-player guarantee
//!
//! At most one synthesized reply plays at a time. Starting a new one stops
//! whatever is in flight first; the host reports completion back to the
//! controller. The speaker hardware sits behind [`SpeakerPort`].

use crate::Result;

/// Seam to the audio output
pub trait SpeakerPort: Send {
    /// Begin playing the referenced audio (data URL or asset path)
    fn play(&mut self, audio_ref: &str) -> Result<()>;

    /// Stop and discard any current playback
    fn stop(&mut self);
}

/// Tracks the at-most-one in-flight playback
#[derive(Debug, Default)]
pub struct PlaybackGuard {
    current: Option<String>,
}

impl PlaybackGuard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.current.is_some()
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Start playing, stopping any previous playback first
    pub fn start(&mut self, speaker: &mut dyn SpeakerPort, audio_ref: &str) -> Result<()> {
        if self.current.is_some() {
            speaker.stop();
            self.current = None;
        }
        speaker.play(audio_ref)?;
        self.current = Some(audio_ref.to_string());
        Ok(())
    }

    /// Stop and discard whatever is playing
    pub fn stop(&mut self, speaker: &mut dyn SpeakerPort) {
        if self.current.take().is_some() {
            speaker.stop();
        }
    }

    /// The host finished playing the current audio
    pub fn finished(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct RecordingSpeaker {
        played: Vec<String>,
        stops: usize,
    }

    impl SpeakerPort for RecordingSpeaker {
        fn play(&mut self, audio_ref: &str) -> Result<()> {
            self.played.push(audio_ref.to_string());
            Ok(())
        }

        fn stop(&mut self) {
            self.stops += 1;
        }
    }

    #[test]
    fn test_start_tracks_current() {
        let mut speaker = RecordingSpeaker::default();
        let mut guard = PlaybackGuard::new();

        guard.start(&mut speaker, "clip-a").unwrap();
        assert!(guard.is_playing());
        assert_eq!(guard.current(), Some("clip-a"));
        assert_eq!(speaker.stops, 0);
    }

    #[test]
    fn test_new_playback_stops_previous() {
        let mut speaker = RecordingSpeaker::default();
        let mut guard = PlaybackGuard::new();

        guard.start(&mut speaker, "clip-a").unwrap();
        guard.start(&mut speaker, "clip-b").unwrap();

        assert_eq!(speaker.stops, 1);
        assert_eq!(speaker.played, vec!["clip-a", "clip-b"]);
        assert_eq!(guard.current(), Some("clip-b"));
    }

    #[test]
    fn test_stop_is_idempotent() {
        let mut speaker = RecordingSpeaker::default();
        let mut guard = PlaybackGuard::new();

        guard.start(&mut speaker, "clip-a").unwrap();
        guard.stop(&mut speaker);
        guard.stop(&mut speaker);

        assert_eq!(speaker.stops, 1);
        assert!(!guard.is_playing());
    }

    #[test]
    fn test_finished_clears_without_stop_call() {
        let mut speaker = RecordingSpeaker::default();
        let mut guard = PlaybackGuard::new();

        guard.start(&mut speaker, "clip-a").unwrap();
        guard.finished();

        assert!(!guard.is_playing());
        assert_eq!(speaker.stops, 0);
    }
}
