//! Error types for the distribution module.

use thiserror::Error;

/// Errors that can occur while distributing fragments.
///
/// Individual backend failures are not errors; they are reported per call.
#[derive(Debug, Error)]
pub enum DistError {
    /// No backends were supplied.
    #[error("no storage backends configured")]
    NoBackends,

    /// Distribution parameters out of range.
    #[error("invalid distribution config: {0}")]
    InvalidConfig(String),
}

/// Result type for distribution operations.
pub type Result<T> = std::result::Result<T, DistError>;
