//! Error types for ScratchForge

use thiserror::Error;

/// Core error type
#[derive(Error, Debug)]
pub enum SfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invariant violated: {0}")]
    Invariant(String),
}

/// Result type alias
pub type SfResult<T> = Result<T, SfError>;
