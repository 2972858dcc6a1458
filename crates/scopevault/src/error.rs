//! Error types for the Vault.

use scopevault_core::{ContentHash, CoreError};
use scopevault_dist::DistError;
use scopevault_envelope::EnvelopeError;
use scopevault_shard::ShardError;
use thiserror::Error;

/// Errors that can occur during Vault operations.
///
/// The conditions callers are expected to branch on are lifted to the top
/// level; everything else is wrapped by source crate.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Too few fragments were stored, or too few could be opened.
    #[error("insufficient fragments: need {required}, have {available}")]
    InsufficientFragments { required: u32, available: u32 },

    /// A complete reconstruction does not match its recorded digest.
    #[error("integrity violation: expected {expected}, got {actual}")]
    IntegrityViolation {
        expected: ContentHash,
        actual: ContentHash,
    },

    /// The credential opened no scope of the envelope.
    #[error("no accessible data")]
    NoAccessibleData,

    /// Configuration out of range.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Core error (credentials, keys, sealing).
    #[error("core error: {0}")]
    Core(#[from] CoreError),

    /// Envelope error.
    #[error("envelope error: {0}")]
    Envelope(#[source] EnvelopeError),

    /// Fragmentation error.
    #[error("shard error: {0}")]
    Shard(#[source] ShardError),

    /// Distribution error.
    #[error("distribution error: {0}")]
    Dist(#[source] DistError),
}

impl From<EnvelopeError> for VaultError {
    fn from(e: EnvelopeError) -> Self {
        match e {
            EnvelopeError::NoAccessibleData => VaultError::NoAccessibleData,
            EnvelopeError::Core(e) => VaultError::Core(e),
            other => VaultError::Envelope(other),
        }
    }
}

impl From<ShardError> for VaultError {
    fn from(e: ShardError) -> Self {
        match e {
            ShardError::InsufficientFragments {
                required,
                available,
            } => VaultError::InsufficientFragments {
                required,
                available,
            },
            ShardError::IntegrityViolation { expected, actual } => {
                VaultError::IntegrityViolation { expected, actual }
            }
            ShardError::InvalidConfig(msg) => VaultError::InvalidConfig(msg),
            ShardError::Core(e) => VaultError::Core(e),
            other => VaultError::Shard(other),
        }
    }
}

impl From<DistError> for VaultError {
    fn from(e: DistError) -> Self {
        match e {
            DistError::InvalidConfig(msg) => VaultError::InvalidConfig(msg),
            other => VaultError::Dist(other),
        }
    }
}

/// Result type for Vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
