//! 2D positions for slot anchors and shuffle animation

use serde::{Deserialize, Serialize};

/// 2D point / vector in host layout units
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point at `distance` from `self` in direction `angle` (radians)
    #[inline]
    pub fn polar_offset(self, angle: f32, distance: f32) -> Self {
        Self::new(self.x + angle.cos() * distance, self.y + angle.sin() * distance)
    }

    /// Unclamped linear interpolation (t may overshoot for OutBack easing)
    #[inline]
    pub fn lerp(self, to: Self, t: f32) -> Self {
        Self::new(self.x + (to.x - self.x) * t, self.y + (to.y - self.y) * t)
    }

    #[inline]
    pub fn distance(self, other: Self) -> f32 {
        ((other.x - self.x).powi(2) + (other.y - self.y).powi(2)).sqrt()
    }

    /// Arithmetic mean of a set of points, `ZERO` for an empty set
    pub fn centroid(points: &[Self]) -> Self {
        if points.is_empty() {
            return Self::ZERO;
        }
        let (sx, sy) = points
            .iter()
            .fold((0.0f32, 0.0f32), |(sx, sy), p| (sx + p.x, sy + p.y));
        let n = points.len() as f32;
        Self::new(sx / n, sy / n)
    }
}
