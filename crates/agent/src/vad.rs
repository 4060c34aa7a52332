//! Energy-threshold voice-activity gate for continuous mode
//!
//! A deliberately simple detector: capture starts when the measured audio
//! level crosses an activation threshold and ends after the level has stayed
//! below a quiet threshold for a fixed hold. The thresholds are configuration,
//! not magic numbers; the defaults match typical normalized microphone levels
//! but carry no tuning guarantees.

use std::time::{Duration, Instant};

/// Thresholds and timing for the energy gate
#[derive(Clone, Copy, Debug)]
pub struct VadConfig {
    /// Normalized level (0.0 to 1.0) above which speech is assumed to start
    pub activation: f32,

    /// Normalized level below which the signal counts as quiet
    pub quiet: f32,

    /// How long the level must stay quiet before the clip is committed
    pub hold: Duration,
}

impl Default for VadConfig {
    fn default() -> Self {
        Self {
            activation: 0.1,
            quiet: 0.05,
            hold: Duration::from_millis(2000),
        }
    }
}

impl VadConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the activation threshold, clamped to 0.0..=1.0
    pub fn with_activation(mut self, activation: f32) -> Self {
        self.activation = activation.clamp(0.0, 1.0);
        self
    }

    /// Set the quiet threshold, clamped to 0.0..=1.0
    pub fn with_quiet(mut self, quiet: f32) -> Self {
        self.quiet = quiet.clamp(0.0, 1.0);
        self
    }

    /// Set the silence hold duration
    pub fn with_hold(mut self, hold: Duration) -> Self {
        self.hold = hold;
        self
    }
}

/// One-shot deadline owned by the gate
///
/// Armed when quiet begins, cancelled by any transition that makes the
/// pending commit meaningless. Expiry is checked against a caller-supplied
/// clock so behaviour is deterministic under test.
#[derive(Clone, Copy, Debug, Default)]
pub struct SilenceTimer {
    deadline: Option<Instant>,
}

impl SilenceTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm the timer if it is not already armed
    pub fn arm(&mut self, now: Instant, hold: Duration) {
        if self.deadline.is_none() {
            self.deadline = Some(now + hold);
        }
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn expired(&self, now: Instant) -> bool {
        self.deadline.is_some_and(|deadline| now >= deadline)
    }
}

/// What the gate wants the capture pipeline to do after a level sample
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GateAction {
    /// Speech detected: start buffering a clip
    Begin,
    /// Quiet held long enough: stop buffering and submit the clip
    Commit,
}

/// Voice-activity gate fed one level sample per animation frame
#[derive(Clone, Debug)]
pub struct EnergyGate {
    config: VadConfig,
    capturing: bool,
    timer: SilenceTimer,
}

impl EnergyGate {
    pub fn new(config: VadConfig) -> Self {
        Self {
            config,
            capturing: false,
            timer: SilenceTimer::new(),
        }
    }

    pub fn config(&self) -> &VadConfig {
        &self.config
    }

    pub fn is_capturing(&self) -> bool {
        self.capturing
    }

    /// Feed one level sample; returns the action the sample triggered
    pub fn process(&mut self, level: f32, now: Instant) -> Option<GateAction> {
        if !self.capturing {
            if level > self.config.activation {
                self.capturing = true;
                self.timer.cancel();
                return Some(GateAction::Begin);
            }
            return None;
        }

        if level < self.config.quiet {
            self.timer.arm(now, self.config.hold);
            if self.timer.expired(now) {
                self.capturing = false;
                self.timer.cancel();
                return Some(GateAction::Commit);
            }
        } else {
            // Any non-quiet level restarts the hold
            self.timer.cancel();
        }

        None
    }

    /// Forget everything, e.g. when continuous mode is left
    pub fn reset(&mut self) {
        self.capturing = false;
        self.timer.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gate() -> EnergyGate {
        EnergyGate::new(VadConfig::default())
    }

    #[test]
    fn test_defaults() {
        let config = VadConfig::default();
        assert_eq!(config.activation, 0.1);
        assert_eq!(config.quiet, 0.05);
        assert_eq!(config.hold, Duration::from_millis(2000));
    }

    #[test]
    fn test_builders_clamp() {
        let config = VadConfig::new().with_activation(2.0).with_quiet(-1.0);
        assert_eq!(config.activation, 1.0);
        assert_eq!(config.quiet, 0.0);
    }

    #[test]
    fn test_speech_starts_capture() {
        let mut gate = gate();
        let now = Instant::now();

        assert_eq!(gate.process(0.02, now), None);
        assert_eq!(gate.process(0.5, now), Some(GateAction::Begin));
        assert!(gate.is_capturing());
    }

    #[test]
    fn test_quiet_hold_commits() {
        let mut gate = gate();
        let start = Instant::now();

        assert_eq!(gate.process(0.5, start), Some(GateAction::Begin));

        // Quiet frames inside the hold window do not commit
        assert_eq!(gate.process(0.01, start + Duration::from_millis(100)), None);
        assert_eq!(gate.process(0.01, start + Duration::from_millis(1000)), None);

        // The hold was armed at t+100ms, so t+2200ms is past the deadline
        assert_eq!(
            gate.process(0.01, start + Duration::from_millis(2200)),
            Some(GateAction::Commit)
        );
        assert!(!gate.is_capturing());
    }

    #[test]
    fn test_speech_resets_hold() {
        let mut gate = gate();
        let start = Instant::now();

        gate.process(0.5, start);
        gate.process(0.01, start + Duration::from_millis(100));

        // Speech again before the hold elapses
        assert_eq!(gate.process(0.4, start + Duration::from_millis(500)), None);

        // Quiet restarts the full hold from here
        assert_eq!(gate.process(0.01, start + Duration::from_millis(600)), None);
        assert_eq!(
            gate.process(0.01, start + Duration::from_millis(2500)),
            None
        );
        assert_eq!(
            gate.process(0.01, start + Duration::from_millis(2700)),
            Some(GateAction::Commit)
        );
    }

    #[test]
    fn test_mid_band_level_resets_hold() {
        let mut gate = gate();
        let start = Instant::now();

        gate.process(0.5, start);
        gate.process(0.01, start + Duration::from_millis(100));

        // Between quiet and activation: not speech, but not quiet either
        gate.process(0.07, start + Duration::from_millis(1500));

        // The earlier hold must have been cancelled
        assert_eq!(
            gate.process(0.01, start + Duration::from_millis(2200)),
            None
        );
        assert_eq!(
            gate.process(0.01, start + Duration::from_millis(4300)),
            Some(GateAction::Commit)
        );
    }

    #[test]
    fn test_reset_clears_capture() {
        let mut gate = gate();
        gate.process(0.5, Instant::now());
        assert!(gate.is_capturing());

        gate.reset();
        assert!(!gate.is_capturing());
        assert!(!gate.timer.is_armed());
    }

    #[test]
    fn test_silence_timer_arm_is_sticky() {
        let mut timer = SilenceTimer::new();
        let now = Instant::now();

        timer.arm(now, Duration::from_secs(2));
        let first_deadline = timer.deadline;

        // A second arm while armed must not push the deadline out
        timer.arm(now + Duration::from_secs(1), Duration::from_secs(2));
        assert_eq!(timer.deadline, first_deadline);

        assert!(!timer.expired(now + Duration::from_secs(1)));
        assert!(timer.expired(now + Duration::from_secs(2)));
    }

    #[test]
    fn test_custom_thresholds() {
        let config = VadConfig::new()
            .with_activation(0.3)
            .with_quiet(0.2)
            .with_hold(Duration::from_millis(500));
        let mut gate = EnergyGate::new(config);
        let start = Instant::now();

        // Below the custom activation, the default-activation level is ignored
        assert_eq!(gate.process(0.15, start), None);
        assert_eq!(gate.process(0.35, start), Some(GateAction::Begin));

        gate.process(0.1, start + Duration::from_millis(100));
        assert_eq!(
            gate.process(0.1, start + Duration::from_millis(700)),
            Some(GateAction::Commit)
        );
    }
}
