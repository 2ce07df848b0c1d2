//! Lottery error types

use sf_core::SfError;

/// Configuration loading / validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yml::Error),

    #[error("Unsupported config format: {0}")]
    UnsupportedFormat(String),

    #[error("Prize pool holds {0} jackpots, at most one is allowed")]
    MultipleJackpots(usize),

    #[error("max_clicks must be at least 1")]
    ZeroMaxClicks,

    #[error("Duplicate slot name: {0}")]
    DuplicateSlotName(String),
}

impl From<ConfigError> for SfError {
    fn from(e: ConfigError) -> Self {
        match e {
            ConfigError::Io(io) => SfError::Io(io),
            ConfigError::Json(e) => SfError::Serialization(e.to_string()),
            ConfigError::Yaml(e) => SfError::Serialization(e.to_string()),
            other => SfError::Config(other.to_string()),
        }
    }
}

/// Broken engine invariant, reported by `LotteryEngine::validate`
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LotteryError {
    #[error("Slot {0} has no assigned prize")]
    MissingAssignment(usize),

    #[error("Assignment for unknown slot {0}")]
    UnknownSlot(usize),

    #[error("Slot {0} displays a different prize than its assignment")]
    SlotOutOfSync(usize),

    #[error("Jackpot assigned to more than one slot: {0:?}")]
    MultipleJackpots(Vec<usize>),

    #[error("Jackpot index {0} does not point at an unclaimed jackpot")]
    StaleJackpotIndex(usize),

    #[error("Unclaimed jackpot at slot {0} is not tracked")]
    UntrackedJackpot(usize),

    #[error("Jackpot armed while the session is inactive")]
    ArmedWhileInactive,
}

impl From<LotteryError> for SfError {
    fn from(e: LotteryError) -> Self {
        SfError::Invariant(e.to_string())
    }
}
