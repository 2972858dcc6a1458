//! Distribution parameters.

use serde::{Deserialize, Serialize};

use crate::error::{DistError, Result};

/// Largest fragment count the coordinator will probe for.
pub const MAX_PROBED_FRAGMENTS: u32 = 256;

/// Which backends receive which fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Placement {
    /// Every fragment goes to every backend.
    #[default]
    EveryBackend,
    /// Fragment `i` goes to backend `i mod backends.len()`.
    RoundRobin,
}

impl Placement {
    /// Whether fragment `index` is placed on backend `backend` of `count`.
    pub fn places(&self, index: u32, backend: usize, count: usize) -> bool {
        match self {
            Placement::EveryBackend => true,
            Placement::RoundRobin => count > 0 && index as usize % count == backend,
        }
    }
}

/// Coordinator configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DistributionConfig {
    /// Fragment indices `0..total_fragments` are probed on retrieval.
    pub total_fragments: u32,
    pub placement: Placement,
}

impl Default for DistributionConfig {
    fn default() -> Self {
        Self {
            total_fragments: 5,
            placement: Placement::EveryBackend,
        }
    }
}

impl DistributionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.total_fragments == 0 || self.total_fragments > MAX_PROBED_FRAGMENTS {
            return Err(DistError::InvalidConfig(format!(
                "total_fragments must be in 1..={}, got {}",
                MAX_PROBED_FRAGMENTS, self.total_fragments
            )));
        }
        Ok(())
    }
}
