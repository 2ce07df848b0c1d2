//! Timing profiles for board presentation

use serde::{Deserialize, Serialize};

use crate::easing::Easing;

/// Timing profile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimingProfile {
    /// Normal presentation timing
    #[default]
    Normal,
    /// Fast mode
    Turbo,
    /// Studio mode (instant for testing)
    Studio,
    /// Custom timing multiplier
    Custom,
}

/// Detailed presentation timing (seconds)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationTiming {
    /// Profile type
    pub profile: TimingProfile,

    /// Scale factor at the bottom of the press
    pub press_scale: f32,
    /// Press-down duration
    pub press_down_secs: f32,
    /// Press-up duration
    pub press_up_secs: f32,
    /// Cover → reward cross-fade
    pub reveal_fade_secs: f32,

    /// Duration of one scatter pass
    pub scatter_secs: f32,
    /// Scatter passes per shuffle
    pub scatter_passes: u32,
    /// Maximum scatter distance from the board centroid
    pub scatter_radius: f32,
    /// Pause between the last scatter and the return
    pub shuffle_wait_secs: f32,
    /// Per-slot return flight
    pub return_secs: f32,
    /// Delay between consecutive slot returns
    pub return_stagger_secs: f32,

    /// Celebration panel fade-in (also used for the hide fade)
    pub panel_fade_secs: f32,
    /// Panel scale at the start of the intro
    pub panel_scale_from: f32,
    /// Panel scale at the end of the intro
    pub panel_scale_to: f32,
    /// Panel scale-up duration
    pub panel_scale_secs: f32,
    /// Typewriter delay per character
    pub typewriter_char_secs: f32,
    /// Pause between the title and the progress bar
    pub progress_delay_secs: f32,
    /// Progress bar fill duration
    pub progress_fill_secs: f32,
    /// Progress bar fill curve
    pub progress_curve: Easing,
    /// Fade-in of the first video clip
    pub video_fade_in_secs: f32,
    /// Gap between consecutive video clips
    pub video_transition_secs: f32,
}

impl PresentationTiming {
    /// Normal presentation timing
    pub fn normal() -> Self {
        Self {
            profile: TimingProfile::Normal,
            press_scale: 0.85,
            press_down_secs: 0.1,
            press_up_secs: 0.1,
            reveal_fade_secs: 0.5,
            scatter_secs: 0.3,
            scatter_passes: 5,
            scatter_radius: 3.0,
            shuffle_wait_secs: 0.5,
            return_secs: 0.5,
            return_stagger_secs: 0.05,
            panel_fade_secs: 0.3,
            panel_scale_from: 0.5,
            panel_scale_to: 1.0,
            panel_scale_secs: 0.4,
            typewriter_char_secs: 0.1,
            progress_delay_secs: 0.5,
            progress_fill_secs: 3.0,
            progress_curve: Easing::Linear,
            video_fade_in_secs: 0.3,
            video_transition_secs: 0.0,
        }
    }

    /// Turbo mode
    pub fn turbo() -> Self {
        Self {
            profile: TimingProfile::Turbo,
            press_down_secs: 0.05,
            press_up_secs: 0.05,
            reveal_fade_secs: 0.2,
            scatter_secs: 0.15,
            scatter_passes: 2,
            shuffle_wait_secs: 0.2,
            return_secs: 0.3,
            return_stagger_secs: 0.02,
            panel_fade_secs: 0.15,
            panel_scale_secs: 0.2,
            typewriter_char_secs: 0.03,
            progress_delay_secs: 0.2,
            progress_fill_secs: 1.0,
            video_fade_in_secs: 0.15,
            ..Self::normal()
        }
    }

    /// Studio mode (every phase completes on the next tick)
    pub fn studio() -> Self {
        Self {
            profile: TimingProfile::Studio,
            ..Self::normal().scaled(0.0)
        }
    }

    /// Get timing for profile
    pub fn from_profile(profile: TimingProfile) -> Self {
        match profile {
            TimingProfile::Normal => Self::normal(),
            TimingProfile::Turbo => Self::turbo(),
            TimingProfile::Studio => Self::studio(),
            TimingProfile::Custom => Self::normal(),
        }
    }

    /// Scale every duration by factor (< 1.0 = faster)
    pub fn scaled(&self, factor: f32) -> Self {
        let factor = factor.max(0.0);
        Self {
            profile: TimingProfile::Custom,
            press_down_secs: self.press_down_secs * factor,
            press_up_secs: self.press_up_secs * factor,
            reveal_fade_secs: self.reveal_fade_secs * factor,
            scatter_secs: self.scatter_secs * factor,
            shuffle_wait_secs: self.shuffle_wait_secs * factor,
            return_secs: self.return_secs * factor,
            return_stagger_secs: self.return_stagger_secs * factor,
            panel_fade_secs: self.panel_fade_secs * factor,
            panel_scale_secs: self.panel_scale_secs * factor,
            typewriter_char_secs: self.typewriter_char_secs * factor,
            progress_delay_secs: self.progress_delay_secs * factor,
            progress_fill_secs: self.progress_fill_secs * factor,
            video_fade_in_secs: self.video_fade_in_secs * factor,
            video_transition_secs: self.video_transition_secs * factor,
            ..self.clone()
        }
    }

    /// Press down + press up + cross-fade
    pub fn reveal_duration(&self) -> f32 {
        self.press_down_secs + self.press_up_secs + self.reveal_fade_secs
    }

    /// Return phase: last slot starts after `(n - 1)` staggers
    pub fn return_duration(&self, slot_count: usize) -> f32 {
        if slot_count == 0 {
            return 0.0;
        }
        (slot_count - 1) as f32 * self.return_stagger_secs + self.return_secs
    }

    /// Whole shuffle, scatter through settle
    pub fn shuffle_duration(&self, slot_count: usize) -> f32 {
        if slot_count == 0 {
            return 0.0;
        }
        self.scatter_passes as f32 * self.scatter_secs
            + self.shuffle_wait_secs
            + self.return_duration(slot_count)
    }

    /// Time to type `chars` characters
    pub fn typewriter_duration(&self, chars: usize) -> f32 {
        chars as f32 * self.typewriter_char_secs
    }

    /// Panel intro: fade and scale run together
    pub fn panel_intro_duration(&self) -> f32 {
        self.panel_fade_secs.max(self.panel_scale_secs)
    }
}

impl Default for PresentationTiming {
    fn default() -> Self {
        Self::normal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_normal_profile() {
        let t = PresentationTiming::normal();
        assert_relative_eq!(t.reveal_duration(), 0.7, epsilon = 1e-6);
        assert_relative_eq!(t.panel_intro_duration(), 0.4);
        // 5 × 0.3 + 0.5 + 9 × 0.05 + 0.5
        assert_relative_eq!(t.shuffle_duration(10), 2.95, epsilon = 1e-5);
        assert_relative_eq!(t.typewriter_duration(12), 1.2, epsilon = 1e-5);
    }

    #[test]
    fn test_turbo_is_faster() {
        let normal = PresentationTiming::normal();
        let turbo = PresentationTiming::turbo();
        assert!(turbo.reveal_duration() < normal.reveal_duration());
        assert!(turbo.shuffle_duration(10) < normal.shuffle_duration(10));
        assert_relative_eq!(turbo.press_scale, normal.press_scale);
    }

    #[test]
    fn test_studio_is_instant() {
        let t = PresentationTiming::studio();
        assert_eq!(t.profile, TimingProfile::Studio);
        assert_relative_eq!(t.reveal_duration(), 0.0);
        assert_relative_eq!(t.shuffle_duration(25), 0.0);
        assert_relative_eq!(t.scatter_radius, 3.0);
        assert_eq!(t.scatter_passes, 5);
    }

    #[test]
    fn test_scaled() {
        let t = PresentationTiming::normal().scaled(2.0);
        assert_eq!(t.profile, TimingProfile::Custom);
        assert_relative_eq!(t.progress_fill_secs, 6.0, epsilon = 1e-6);
        assert_relative_eq!(t.panel_scale_from, 0.5);
        assert_relative_eq!(PresentationTiming::normal().scaled(-1.0).return_secs, 0.0);
    }

    #[test]
    fn test_empty_board_has_no_shuffle() {
        assert_relative_eq!(PresentationTiming::normal().shuffle_duration(0), 0.0);
    }
}
