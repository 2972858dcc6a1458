//! Error types for ScopeVault Core.

use thiserror::Error;

/// Errors raised by the core cryptographic primitives.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Malformed or empty key material. Always a caller error.
    #[error("invalid credential: {0}")]
    InvalidCredential(String),

    /// Requested key length is zero or beyond what the KDF can produce.
    #[error("invalid key length: {0}")]
    InvalidKeyLength(usize),

    #[error("encryption failed: {0}")]
    EncryptionFailed(String),

    /// Wrong key, wrong IV, or corrupted ciphertext.
    ///
    /// Expected while trying candidate keys; never fatal on its own.
    #[error("decryption failed")]
    DecryptionFailed,

    #[error("invalid seed id: {0}")]
    InvalidSeedId(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
