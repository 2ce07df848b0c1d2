//! Easing curves

use serde::{Deserialize, Serialize};

/// Overshoot constant of the back-out curve
const BACK_C1: f32 = 1.70158;
const BACK_C3: f32 = BACK_C1 + 1.0;

/// Easing function applied to normalized phase progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    /// Constant rate
    #[default]
    Linear,
    /// Quadratic, slow start
    EaseIn,
    /// Quadratic, slow end
    EaseOut,
    /// Quadratic, slow start and end
    EaseInOut,
    /// Smoothstep (slow start/end, fast middle)
    SCurve,
    /// Overshoots past 1.0 then settles
    OutBack,
}

impl Easing {
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "Linear",
            Easing::EaseIn => "EaseIn",
            Easing::EaseOut => "EaseOut",
            Easing::EaseInOut => "EaseInOut",
            Easing::SCurve => "SCurve",
            Easing::OutBack => "OutBack",
        }
    }

    /// Evaluate at position t (clamped to 0.0 - 1.0)
    ///
    /// Every curve maps 0 → 0 and 1 → 1. `OutBack` exceeds 1.0 in between.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);

        match self {
            Easing::Linear => t,
            Easing::EaseIn => t * t,
            Easing::EaseOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::SCurve => t * t * (3.0 - 2.0 * t),
            Easing::OutBack => {
                let u = t - 1.0;
                1.0 + BACK_C3 * u.powi(3) + BACK_C1 * u.powi(2)
            }
        }
    }
}

/// Normalized progress of `elapsed` through `duration`; zero-length spans are complete
#[inline]
pub fn progress(elapsed: f32, duration: f32) -> f32 {
    if duration <= 0.0 {
        1.0
    } else {
        (elapsed / duration).clamp(0.0, 1.0)
    }
}

/// Unclamped linear interpolation
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}
