//! Fragmentation parameters.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ShardError};

/// Upper bound on fragments per set.
pub const MAX_FRAGMENTS: u32 = 256;

/// Fragmentation parameters: `n` fragments, threshold `k`, chunk size `s`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FragmentConfig {
    /// Fragments produced per set (`n`).
    pub total_fragments: u32,
    /// Fragments required to attempt reconstruction (`k`).
    pub min_fragments: u32,
    /// Chunk size in bytes (`s`).
    pub chunk_size: usize,
}

impl Default for FragmentConfig {
    fn default() -> Self {
        Self {
            total_fragments: 5,
            min_fragments: 3,
            chunk_size: 1024,
        }
    }
}

impl FragmentConfig {
    /// Create a validated config.
    pub fn new(total_fragments: u32, min_fragments: u32, chunk_size: usize) -> Result<Self> {
        let config = Self {
            total_fragments,
            min_fragments,
            chunk_size,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check `1 <= k <= n <= 256` and `s >= 1`.
    pub fn validate(&self) -> Result<()> {
        if self.min_fragments == 0 {
            return Err(ShardError::InvalidConfig(
                "min_fragments must be at least 1".into(),
            ));
        }
        if self.min_fragments > self.total_fragments {
            return Err(ShardError::InvalidConfig(format!(
                "min_fragments ({}) exceeds total_fragments ({})",
                self.min_fragments, self.total_fragments
            )));
        }
        if self.total_fragments > MAX_FRAGMENTS {
            return Err(ShardError::InvalidConfig(format!(
                "total_fragments ({}) exceeds {}",
                self.total_fragments, MAX_FRAGMENTS
            )));
        }
        if self.chunk_size == 0 {
            return Err(ShardError::InvalidConfig(
                "chunk_size must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// `ceil(n / k)`: period of the redundancy pattern for fragments `>= k`.
    pub fn stride(&self) -> u32 {
        self.total_fragments.div_ceil(self.min_fragments)
    }

    /// Whether chunk `chunk` is carried by fragment `fragment`.
    ///
    /// The first `k` fragments carry every chunk; the rest carry every
    /// `stride`-th chunk, offset by their own index.
    pub fn includes(&self, fragment: u32, chunk: u32) -> bool {
        fragment < self.min_fragments
            || (u64::from(chunk) + u64::from(fragment)) % u64::from(self.stride()) == 0
    }

    /// Whether every subset of `k` fragments is guaranteed to hold a
    /// complete copy.
    ///
    /// Holds exactly when any `k` fragments must include one of the first
    /// `k`, i.e. when `n - k < k`. Otherwise a subset drawn only from the
    /// redundancy fragments may leave chunks missing.
    pub fn any_threshold_subset_recovers(&self) -> bool {
        self.total_fragments.saturating_sub(self.min_fragments) < self.min_fragments
    }
}
