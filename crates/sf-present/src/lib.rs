//! sf-present: Presentation sequencing for ScratchForge
//!
//! Headless, frame-clock driven animation state for the scratch-card board.
//! Nothing here renders; hosts read the exposed values (scale, alpha,
//! positions, visible text) every frame and apply them to their own scene.
//!
//! ## Architecture
//!
//! ```text
//! LotteryEngine ──events──► PresentationDriver ──tick(dt)──► DriverSignal
//!                               │                               │
//!                 ┌─────────────┼──────────────┐                ▼
//!                 ▼             ▼              ▼         mark_revealed /
//!            SlotReveal   ShuffleAnimation  CelebrationSequencer  complete_shuffle
//!                 └─────────────┴──────────────┘
//!                          PhaseSequence + Easing
//! ```
//!
//! All durations come from [`PresentationTiming`], which carries `normal`,
//! `turbo`, `studio` (instant) and `scaled` profiles.

pub mod celebration;
pub mod driver;
pub mod easing;
pub mod reveal;
pub mod scatter;
pub mod sequence;
pub mod timing;

pub use celebration::*;
pub use driver::*;
pub use easing::*;
pub use reveal::*;
pub use scatter::*;
pub use sequence::*;
pub use timing::*;
