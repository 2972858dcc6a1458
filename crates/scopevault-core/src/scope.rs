//! Scope labels.
//!
//! A scope label names a partition of a document (or a fragment slot) and is
//! the `info` input of key derivation. Two different labels always yield
//! independent keys for the same credential.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of a key scope.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScopeLabel(String);

impl ScopeLabel {
    /// Label of the universal key that seals the whole document.
    pub const UNIVERSAL: &'static str = "*";
    /// Fields whose restriction has lapsed.
    pub const RELEASED: &'static str = "released";
    /// Everything not known to be released.
    pub const RESTRICTED: &'static str = "restricted";

    /// Create a label from any string.
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn universal() -> Self {
        Self::new(Self::UNIVERSAL)
    }

    pub fn released() -> Self {
        Self::new(Self::RELEASED)
    }

    pub fn restricted() -> Self {
        Self::new(Self::RESTRICTED)
    }

    /// Label for the key of fragment `index`.
    pub fn fragment(index: u32) -> Self {
        Self(format!("fragment-{}", index))
    }

    /// Get the label string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Get the label bytes (the KDF `info` input).
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn is_universal(&self) -> bool {
        self.0 == Self::UNIVERSAL
    }
}

impl fmt::Display for ScopeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ScopeLabel {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ScopeLabel {
    fn from(s: String) -> Self {
        Self(s)
    }
}
