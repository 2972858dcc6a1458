//! Vault configuration.

use serde::{Deserialize, Serialize};

use scopevault_dist::{DistributionConfig, Placement};
use scopevault_shard::FragmentConfig;

use crate::error::{Result, VaultError};

/// Configuration for the Vault.
///
/// Deserializable so the embedding application can load it from its own
/// configuration source; missing fields take their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Fragmentation parameters.
    pub fragments: FragmentConfig,
    /// Which backends receive which fragment.
    pub placement: Placement,
    /// Distinct fragment indices that must land on some backend for a write
    /// to succeed. Defaults to the reconstruction threshold.
    pub min_stored_fragments: Option<u32>,
}

impl VaultConfig {
    pub fn validate(&self) -> Result<()> {
        self.fragments.validate()?;
        self.distribution().validate()?;

        let required = self.required_stored();
        if required == 0 || required > self.fragments.total_fragments {
            return Err(VaultError::InvalidConfig(format!(
                "min_stored_fragments must be in 1..={}, got {}",
                self.fragments.total_fragments, required
            )));
        }
        Ok(())
    }

    /// Distinct fragments a write must store.
    pub fn required_stored(&self) -> u32 {
        self.min_stored_fragments
            .unwrap_or(self.fragments.min_fragments)
    }

    /// Distribution settings derived from this config.
    pub fn distribution(&self) -> DistributionConfig {
        DistributionConfig {
            total_fragments: self.fragments.total_fragments,
            placement: self.placement,
        }
    }
}
