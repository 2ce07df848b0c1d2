//! Slot reveal animation: press, release, cross-fade cover → reward

use crate::easing::lerp;
use crate::sequence::{Phase, PhaseSequence};
use crate::timing::PresentationTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevealPhase {
    PressDown,
    PressUp,
    CrossFade,
}

/// Per-slot reveal state read by the host every frame
#[derive(Debug, Clone)]
pub struct SlotReveal {
    index: usize,
    press_scale: f32,
    sequence: PhaseSequence<RevealPhase>,
    scale: f32,
    cover_alpha: f32,
    reward_alpha: f32,
}

impl SlotReveal {
    /// Start revealing slot `index`
    pub fn new(index: usize, timing: &PresentationTiming) -> Self {
        let mut sequence = PhaseSequence::new();
        sequence.start(vec![
            Phase::linear(RevealPhase::PressDown, timing.press_down_secs),
            Phase::linear(RevealPhase::PressUp, timing.press_up_secs),
            Phase::linear(RevealPhase::CrossFade, timing.reveal_fade_secs),
        ]);

        Self {
            index,
            press_scale: timing.press_scale,
            sequence,
            scale: 1.0,
            cover_alpha: 1.0,
            reward_alpha: 0.0,
        }
    }

    /// Advance; returns true on the tick the reveal completes
    pub fn tick(&mut self, dt: f32) -> bool {
        if self.sequence.is_finished() {
            return false;
        }

        self.sequence.tick(dt);
        self.update_values();
        self.sequence.is_finished()
    }

    fn update_values(&mut self) {
        let t = self.sequence.eased_progress();
        match self.sequence.current() {
            Some(RevealPhase::PressDown) => {
                self.scale = lerp(1.0, self.press_scale, t);
            }
            Some(RevealPhase::PressUp) => {
                self.scale = lerp(self.press_scale, 1.0, t);
            }
            Some(RevealPhase::CrossFade) => {
                self.scale = 1.0;
                self.cover_alpha = 1.0 - t;
                self.reward_alpha = t;
            }
            None => {
                self.scale = 1.0;
                self.cover_alpha = 0.0;
                self.reward_alpha = 1.0;
            }
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> Option<RevealPhase> {
        self.sequence.current()
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    pub fn cover_alpha(&self) -> f32 {
        self.cover_alpha
    }

    pub fn reward_alpha(&self) -> f32 {
        self.reward_alpha
    }

    pub fn is_finished(&self) -> bool {
        self.sequence.is_finished()
    }
}
