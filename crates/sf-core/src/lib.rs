//! sf-core: Shared types, traits, and utilities for ScratchForge
//!
//! This crate provides the foundational types used across all ScratchForge crates:
//! the workspace error type, opaque asset handles and 2D anchor positions.

mod error;
mod geometry;
mod handle;

pub use error::*;
pub use geometry::*;
pub use handle::*;
