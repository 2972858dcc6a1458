//! Completeness percentages for partial results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Share of original content recovered, as a percentage in `0.0..=100.0`.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Completeness(f64);

impl Completeness {
    /// Nothing recovered.
    pub const NONE: Self = Self(0.0);
    /// Everything recovered.
    pub const FULL: Self = Self(100.0);

    /// `recovered / total * 100`, clamped to 100.
    ///
    /// An empty original (`total == 0`) counts as fully recovered.
    pub fn from_ratio(recovered: usize, total: usize) -> Self {
        if total == 0 || recovered >= total {
            return Self::FULL;
        }
        Self(recovered as f64 / total as f64 * 100.0)
    }

    /// The percentage value.
    pub fn percent(&self) -> f64 {
        self.0
    }

    pub fn is_complete(&self) -> bool {
        self.0 >= 100.0
    }

    pub fn is_empty(&self) -> bool {
        self.0 <= 0.0
    }
}

impl fmt::Display for Completeness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}%", self.0)
    }
}
