//! # sf-lottery — Scratch-card lottery engine for ScratchForge
//!
//! A grid of concealed slots, each hiding a prize, revealed one click at a time.
//! The engine owns prize assignment and the jackpot-protection state machine:
//!
//! - **Never unarmed**: the jackpot is only awarded after an explicit trigger
//! - **Single holder**: at most one slot holds the jackpot at any time
//! - **Relocation**: an armed jackpot moves to whichever slot is clicked next;
//!   an unarmed click on the jackpot slot moves it away
//! - **Resettable**: every invariant survives any click order and repeated resets
//!
//! ## Architecture
//!
//! ```text
//! LotteryEngine
//!     │
//!     ├── Vec<SlotItem>            (stable index, cover icon, reveal state)
//!     ├── BTreeMap<usize, prize>   (assignment map, one entry per slot)
//!     ├── jackpot index + armed flag
//!     └── EventBus / outbox
//!           │
//!           v
//!     LotteryEvent → host presentation (sf-present)
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod prize;
pub mod shuffle;
pub mod slot;

pub use config::*;
pub use engine::*;
pub use error::*;
pub use events::*;
pub use prize::*;
pub use shuffle::*;
pub use slot::*;
