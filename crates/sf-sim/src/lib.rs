//! sf-sim: Session runner and batch audit for ScratchForge
//!
//! - [`session`] plays one scripted session and records its event log
//! - [`audit`] plays many randomized sessions in parallel and checks the
//!   jackpot-protection guarantees after every click

pub mod audit;
pub mod session;

pub use audit::*;
pub use session::*;
