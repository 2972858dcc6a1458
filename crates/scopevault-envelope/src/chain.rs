//! Chain resolution.
//!
//! Related credentials are supplied by the surrounding authorization layer
//! through a [`ChainResolver`]. The core never looks credentials up itself;
//! it only filters what it is given by [`ChainId`] equality.

use std::collections::HashMap;
use std::sync::RwLock;

use scopevault_core::{ChainId, Credential};

/// Supplies the credentials related to a given credential.
pub trait ChainResolver: Send + Sync {
    /// Credentials the caller considers related to `credential`.
    ///
    /// Implementations may return unrelated credentials; callers filter by
    /// chain id before use.
    fn list_related(&self, credential: &Credential) -> Vec<Credential>;
}

/// Resolver that knows no related credentials.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoChain;

impl ChainResolver for NoChain {
    fn list_related(&self, _credential: &Credential) -> Vec<Credential> {
        Vec::new()
    }
}

/// In-memory registry of credentials grouped by chain id.
///
/// Thread-safe via RwLock.
#[derive(Default)]
pub struct StaticChainResolver {
    chains: RwLock<HashMap<ChainId, Vec<Credential>>>,
}

impl StaticChainResolver {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a credential under its chain id.
    pub fn register(&self, credential: Credential) {
        let mut chains = self.chains.write().unwrap_or_else(|e| e.into_inner());
        let members = chains.entry(credential.chain_id()).or_default();
        if !members.contains(&credential) {
            members.push(credential);
        }
    }

    /// Number of credentials registered for a chain.
    pub fn chain_len(&self, chain_id: &ChainId) -> usize {
        let chains = self.chains.read().unwrap_or_else(|e| e.into_inner());
        chains.get(chain_id).map(Vec::len).unwrap_or(0)
    }
}

impl ChainResolver for StaticChainResolver {
    fn list_related(&self, credential: &Credential) -> Vec<Credential> {
        let chains = self.chains.read().unwrap_or_else(|e| e.into_inner());
        chains
            .get(&credential.chain_id())
            .map(|members| {
                members
                    .iter()
                    .filter(|member| *member != credential)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// Keep only the candidates that share `credential`'s chain id.
///
/// The credential itself is skipped.
pub fn related_members<'a>(credential: &Credential, candidates: &'a [Credential]) -> Vec<(usize, &'a Credential)> {
    let chain_id = credential.chain_id();
    candidates
        .iter()
        .enumerate()
        .filter(|(_, candidate)| *candidate != credential && candidate.chain_id() == chain_id)
        .collect()
}
