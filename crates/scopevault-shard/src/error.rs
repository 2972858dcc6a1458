//! Error types for the shard module.

use scopevault_core::ContentHash;
use thiserror::Error;

/// Errors that can occur while splitting or reconstructing.
#[derive(Debug, Error)]
pub enum ShardError {
    /// Fewer usable fragments than the set's threshold.
    #[error("insufficient fragments: need {required}, have {available}")]
    InsufficientFragments { required: u32, available: u32 },

    /// A complete reconstruction does not match the recorded digest.
    #[error("integrity violation: expected {expected}, got {actual}")]
    IntegrityViolation {
        expected: ContentHash,
        actual: ContentHash,
    },

    /// Authenticated fragments describe an impossible set.
    #[error("malformed fragment set: {0}")]
    MalformedSet(String),

    /// Fragmentation parameters out of range.
    #[error("invalid fragment config: {0}")]
    InvalidConfig(String),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] scopevault_core::CoreError),
}

/// Result type for shard operations.
pub type Result<T> = std::result::Result<T, ShardError>;
