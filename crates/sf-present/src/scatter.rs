//! Shuffle animation
//!
//! Slots fly out to random points around the board centroid several times,
//! pause, then return to their anchors one after another with a back-out
//! overshoot. Prize assignment is not touched; the animation is cosmetic and
//! the engine only needs to know when it has settled.

use std::f32::consts::TAU;

use rand::Rng;
use sf_core::Vec2;

use crate::easing::{Easing, progress};
use crate::sequence::{Phase, PhaseSequence};
use crate::timing::PresentationTiming;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShufflePhase {
    /// Scatter pass (0-based)
    Scatter(u32),
    Wait,
    Return,
}

/// Cosmetic scatter/return animation over a set of slot anchors
#[derive(Debug, Clone)]
pub struct ShuffleAnimation {
    anchors: Vec<Vec2>,
    /// Scatter targets, one list per pass
    targets: Vec<Vec<Vec2>>,
    stagger: f32,
    return_secs: f32,
    sequence: PhaseSequence<ShufflePhase>,
    positions: Vec<Vec2>,
}

impl ShuffleAnimation {
    /// Plan every scatter pass up front from `rng`
    pub fn new<R: Rng + ?Sized>(anchors: Vec<Vec2>, timing: &PresentationTiming, rng: &mut R) -> Self {
        let center = Vec2::centroid(&anchors);
        let radius = timing.scatter_radius.max(0.0);

        let targets: Vec<Vec<Vec2>> = (0..timing.scatter_passes)
            .map(|_| {
                anchors
                    .iter()
                    .map(|_| {
                        let angle = rng.random_range(0.0..TAU);
                        let distance = rng.random_range(radius * 0.5..=radius);
                        center.polar_offset(angle, distance)
                    })
                    .collect()
            })
            .collect();

        let mut phases: Vec<Phase<ShufflePhase>> = (0..timing.scatter_passes)
            .map(|pass| Phase::linear(ShufflePhase::Scatter(pass), timing.scatter_secs))
            .collect();
        phases.push(Phase::linear(ShufflePhase::Wait, timing.shuffle_wait_secs));
        phases.push(Phase::linear(
            ShufflePhase::Return,
            timing.return_duration(anchors.len()),
        ));

        let mut sequence = PhaseSequence::new();
        if anchors.is_empty() {
            sequence.start(Vec::new());
        } else {
            sequence.start(phases);
        }

        log::debug!(
            "Shuffle planned: {} slots, {} passes, {:.2}s",
            anchors.len(),
            timing.scatter_passes,
            timing.shuffle_duration(anchors.len())
        );

        Self {
            positions: anchors.clone(),
            anchors,
            targets,
            stagger: timing.return_stagger_secs,
            return_secs: timing.return_secs,
            sequence,
        }
    }

    /// Advance; returns true on the tick the board settles
    pub fn tick(&mut self, dt: f32) -> bool {
        if !self.sequence.is_running() {
            return false;
        }

        self.sequence.tick(dt);
        self.update_positions();
        self.sequence.is_finished()
    }

    fn update_positions(&mut self) {
        let elapsed = self.sequence.phase_elapsed();
        let t = self.sequence.eased_progress();
        let last = self.targets.last().unwrap_or(&self.anchors);

        match self.sequence.current() {
            Some(ShufflePhase::Scatter(pass)) => {
                let pass = pass as usize;
                let from = match pass.checked_sub(1) {
                    Some(prev) => &self.targets[prev],
                    None => &self.anchors,
                };
                let to = &self.targets[pass];
                for (i, pos) in self.positions.iter_mut().enumerate() {
                    *pos = from[i].lerp(to[i], t);
                }
            }
            Some(ShufflePhase::Wait) => {
                self.positions.copy_from_slice(last);
            }
            Some(ShufflePhase::Return) => {
                for (i, pos) in self.positions.iter_mut().enumerate() {
                    let start = i as f32 * self.stagger;
                    let eased = if elapsed < start {
                        0.0
                    } else {
                        Easing::OutBack.apply(progress(elapsed - start, self.return_secs))
                    };
                    *pos = last[i].lerp(self.anchors[i], eased);
                }
            }
            None => {
                self.positions.copy_from_slice(&self.anchors);
            }
        }
    }

    /// Current slot positions, in anchor order
    pub fn positions(&self) -> &[Vec2] {
        &self.positions
    }

    pub fn anchors(&self) -> &[Vec2] {
        &self.anchors
    }

    /// Planned scatter points for pass `pass`
    pub fn scatter_targets(&self, pass: usize) -> Option<&[Vec2]> {
        self.targets.get(pass).map(Vec::as_slice)
    }

    pub fn phase(&self) -> Option<ShufflePhase> {
        self.sequence.current()
    }

    /// Every slot is back on its anchor
    pub fn is_settled(&self) -> bool {
        self.sequence.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sf_lottery::session_rng;

    fn anchors() -> Vec<Vec2> {
        vec![
            Vec2::new(-1.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(0.0, 2.0),
        ]
    }

    fn timing() -> PresentationTiming {
        PresentationTiming {
            scatter_secs: 0.25,
            scatter_passes: 2,
            scatter_radius: 4.0,
            shuffle_wait_secs: 0.5,
            return_secs: 0.5,
            return_stagger_secs: 0.125,
            ..PresentationTiming::normal()
        }
    }

    #[test]
    fn test_scatter_targets_within_ring() {
        let mut rng = session_rng(Some(5));
        let anim = ShuffleAnimation::new(anchors(), &timing(), &mut rng);
        let center = Vec2::centroid(&anchors());
        for pass in 0..2 {
            for p in anim.scatter_targets(pass).unwrap() {
                let d = p.distance(center);
                assert!((2.0 - 1e-4..=4.0 + 1e-4).contains(&d), "distance {}", d);
            }
        }
        assert!(anim.scatter_targets(2).is_none());
    }

    #[test]
    fn test_phases_and_settle() {
        let mut rng = session_rng(Some(5));
        let mut anim = ShuffleAnimation::new(anchors(), &timing(), &mut rng);
        assert_eq!(anim.phase(), Some(ShufflePhase::Scatter(0)));

        // End of pass 0 lands exactly on its targets
        anim.tick(0.25);
        assert_eq!(anim.phase(), Some(ShufflePhase::Scatter(1)));
        let first = anim.scatter_targets(0).unwrap().to_vec();
        for (p, t) in anim.positions().iter().zip(&first) {
            assert_relative_eq!(p.x, t.x, epsilon = 1e-5);
            assert_relative_eq!(p.y, t.y, epsilon = 1e-5);
        }

        anim.tick(0.25);
        assert_eq!(anim.phase(), Some(ShufflePhase::Wait));

        anim.tick(0.5);
        assert_eq!(anim.phase(), Some(ShufflePhase::Return));
        assert!(!anim.is_settled());

        // Return lasts 2 × 0.125 + 0.5
        assert!(!anim.tick(0.5));
        assert!(anim.tick(0.25));
        assert!(anim.is_settled());
        assert_eq!(anim.positions(), anim.anchors());
        assert!(!anim.tick(1.0));
    }

    #[test]
    fn test_return_is_staggered() {
        let mut rng = session_rng(Some(9));
        let mut anim = ShuffleAnimation::new(anchors(), &timing(), &mut rng);
        anim.tick(1.0);
        anim.tick(0.0625);
        assert_eq!(anim.phase(), Some(ShufflePhase::Return));

        // Slot 0 has started, slots 1 and 2 are still at their last scatter point
        let last = anim.scatter_targets(1).unwrap().to_vec();
        assert_ne!(anim.positions()[0], last[0]);
        assert_eq!(anim.positions()[1], last[1]);
        assert_eq!(anim.positions()[2], last[2]);
    }

    #[test]
    fn test_empty_board_settles_immediately() {
        let mut rng = session_rng(Some(1));
        let mut anim = ShuffleAnimation::new(Vec::new(), &timing(), &mut rng);
        assert!(anim.is_settled());
        assert!(anim.positions().is_empty());
        assert!(!anim.tick(0.1));
    }

    #[test]
    fn test_studio_shuffle_settles_on_first_tick() {
        let mut rng = session_rng(Some(1));
        let mut anim = ShuffleAnimation::new(anchors(), &PresentationTiming::studio(), &mut rng);
        assert!(anim.tick(0.0));
        assert_eq!(anim.positions(), anim.anchors());
    }
}
