//! Error types for the envelope module.

use thiserror::Error;

/// Errors that can occur while sealing or opening envelopes.
#[derive(Debug, Error)]
pub enum EnvelopeError {
    /// Neither the credential nor any related credential opened a scope.
    #[error("no accessible data: credential opened no scope")]
    NoAccessibleData,

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Core error.
    #[error("core error: {0}")]
    Core(#[from] scopevault_core::CoreError),
}

/// Result type for envelope operations.
pub type Result<T> = std::result::Result<T, EnvelopeError>;
