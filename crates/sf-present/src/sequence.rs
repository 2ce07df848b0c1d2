//! Phase sequences
//!
//! A multi-stage animation is an ordered list of phases, each with a duration
//! and an easing curve. The host advances it with `tick(dt)` from its frame
//! clock. Time left over when a phase ends flows into the next one, so large
//! frame steps never stall a sequence.

use crate::easing::{Easing, progress};

/// One named stage of a sequence
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Phase<K> {
    pub key: K,
    /// Seconds; zero-length phases finish on the next tick
    pub duration: f32,
    pub easing: Easing,
}

impl<K> Phase<K> {
    pub fn new(key: K, duration: f32, easing: Easing) -> Self {
        Self {
            key,
            duration: duration.max(0.0),
            easing,
        }
    }

    pub fn linear(key: K, duration: f32) -> Self {
        Self::new(key, duration, Easing::Linear)
    }
}

/// Sequence state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SequenceState {
    #[default]
    Idle,
    Running,
    Finished,
}

/// Ordered phase list driven by a frame clock
#[derive(Debug, Clone)]
pub struct PhaseSequence<K> {
    phases: Vec<Phase<K>>,
    current: usize,
    elapsed: f32,
    state: SequenceState,
}

impl<K> Default for PhaseSequence<K> {
    fn default() -> Self {
        Self {
            phases: Vec::new(),
            current: 0,
            elapsed: 0.0,
            state: SequenceState::Idle,
        }
    }
}

impl<K: Copy> PhaseSequence<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any running phases and start from the first one
    pub fn start(&mut self, phases: Vec<Phase<K>>) {
        self.state = if phases.is_empty() {
            SequenceState::Finished
        } else {
            SequenceState::Running
        };
        self.phases = phases;
        self.current = 0;
        self.elapsed = 0.0;
    }

    /// Advance by `dt` seconds; returns the phases that finished, in order
    pub fn tick(&mut self, dt: f32) -> Vec<K> {
        let mut finished = Vec::new();
        if self.state != SequenceState::Running {
            return finished;
        }

        let mut remaining = dt.max(0.0);
        while let Some(phase) = self.phases.get(self.current) {
            let left = (phase.duration - self.elapsed).max(0.0);
            if remaining < left {
                self.elapsed += remaining;
                break;
            }

            remaining -= left;
            finished.push(phase.key);
            self.current += 1;
            self.elapsed = 0.0;
        }

        if self.current >= self.phases.len() {
            self.state = SequenceState::Finished;
        }
        finished
    }

    /// Abandon the phase list and return to idle
    pub fn cancel(&mut self) {
        self.phases.clear();
        self.current = 0;
        self.elapsed = 0.0;
        self.state = SequenceState::Idle;
    }

    /// Key of the running phase
    pub fn current(&self) -> Option<K> {
        self.current_phase().map(|p| p.key)
    }

    pub fn current_phase(&self) -> Option<&Phase<K>> {
        if self.state != SequenceState::Running {
            return None;
        }
        self.phases.get(self.current)
    }

    /// Seconds spent in the running phase
    pub fn phase_elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Linear progress through the running phase (0.0 - 1.0)
    pub fn phase_progress(&self) -> f32 {
        self.current_phase()
            .map_or(0.0, |p| progress(self.elapsed, p.duration))
    }

    /// Running phase progress with its easing applied
    pub fn eased_progress(&self) -> f32 {
        self.current_phase()
            .map_or(0.0, |p| p.easing.apply(progress(self.elapsed, p.duration)))
    }

    pub fn total_duration(&self) -> f32 {
        self.phases.iter().map(|p| p.duration).sum()
    }

    pub fn state(&self) -> SequenceState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SequenceState::Idle
    }

    pub fn is_running(&self) -> bool {
        self.state == SequenceState::Running
    }

    pub fn is_finished(&self) -> bool {
        self.state == SequenceState::Finished
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Step {
        A,
        B,
        C,
    }

    fn abc() -> Vec<Phase<Step>> {
        vec![
            Phase::linear(Step::A, 0.5),
            Phase::new(Step::B, 0.25, Easing::EaseIn),
            Phase::linear(Step::C, 1.0),
        ]
    }

    #[test]
    fn test_runs_in_order() {
        let mut seq = PhaseSequence::new();
        assert!(seq.is_idle());
        seq.start(abc());
        assert_eq!(seq.current(), Some(Step::A));
        assert_relative_eq!(seq.total_duration(), 1.75);

        assert!(seq.tick(0.25).is_empty());
        assert_relative_eq!(seq.phase_progress(), 0.5);

        assert_eq!(seq.tick(0.375), vec![Step::A]);
        assert_eq!(seq.current(), Some(Step::B));
        assert_relative_eq!(seq.phase_elapsed(), 0.125);
        assert_relative_eq!(seq.eased_progress(), 0.25);
    }

    #[test]
    fn test_large_step_crosses_phases() {
        let mut seq = PhaseSequence::new();
        seq.start(abc());
        assert_eq!(seq.tick(10.0), vec![Step::A, Step::B, Step::C]);
        assert!(seq.is_finished());
        assert_eq!(seq.current(), None);
        assert!(seq.tick(1.0).is_empty());
    }

    #[test]
    fn test_zero_duration_phases() {
        let mut seq = PhaseSequence::new();
        seq.start(vec![Phase::linear(Step::A, 0.0), Phase::linear(Step::B, 0.0)]);
        assert_eq!(seq.tick(0.0), vec![Step::A, Step::B]);
        assert!(seq.is_finished());
    }

    #[test]
    fn test_empty_sequence_is_finished() {
        let mut seq: PhaseSequence<Step> = PhaseSequence::new();
        seq.start(Vec::new());
        assert!(seq.is_finished());
    }

    #[test]
    fn test_cancel_returns_to_idle() {
        let mut seq = PhaseSequence::new();
        seq.start(abc());
        seq.tick(0.6);
        seq.cancel();
        assert!(seq.is_idle());
        assert_eq!(seq.current(), None);
        assert!(seq.tick(5.0).is_empty());
    }

    #[test]
    fn test_negative_dt_ignored() {
        let mut seq = PhaseSequence::new();
        seq.start(abc());
        seq.tick(-1.0);
        assert_relative_eq!(seq.phase_elapsed(), 0.0);
    }
}
