//! Error types for the store module.

use thiserror::Error;

/// Errors that can occur during backend operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from SQLite.
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// Fragment serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// No fragment stored at this position.
    #[error("fragment not found: {seed_id}/{index}")]
    NotFound { seed_id: String, index: u32 },

    /// Stored or supplied data is inconsistent.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// The backend did not answer in time.
    #[error("backend {backend} timed out after {millis} ms")]
    Timeout { backend: String, millis: u64 },

    /// Backend-specific failure (unreachable service, worker panic, ...).
    #[error("backend error: {0}")]
    Backend(String),

    /// Migration error.
    #[error("migration error: {0}")]
    Migration(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }
}

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
