//! Test fixtures and faulty backends.
//!
//! Common setup code for integration tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use scopevault::{Vault, VaultConfig};
use scopevault_core::{Credential, Fragment, ScopeLabel, SeedId};
use scopevault_dist::Backend;
use scopevault_envelope::{Document, StaticChainResolver};
use scopevault_store::{MemoryBackend, StorageBackend, StoreError};

/// Classifier releasing fields whose name starts with `pub_`.
pub fn prefix_classifier(field: &str, _value: &Value) -> ScopeLabel {
    if field.starts_with("pub_") {
        ScopeLabel::released()
    } else {
        ScopeLabel::restricted()
    }
}

/// Build a document from a JSON object literal. Non-objects give an empty
/// document.
pub fn document(value: Value) -> Document {
    match value {
        Value::Object(map) => map,
        _ => Document::new(),
    }
}

/// A vault over in-memory backends, with an owner and one delegate
/// registered in the same chain.
pub struct TestFixture {
    pub vault: Vault,
    pub memories: Vec<Arc<MemoryBackend>>,
    pub owner: Credential,
    pub delegate: Credential,
    pub stranger: Credential,
}

impl TestFixture {
    /// Default config over three memory backends.
    pub fn new() -> Self {
        Self::with_config(VaultConfig::default(), 3)
    }

    pub fn with_config(config: VaultConfig, backends: usize) -> Self {
        let memories: Vec<Arc<MemoryBackend>> = (0..backends)
            .map(|i| Arc::new(MemoryBackend::new(format!("mem-{}", i))))
            .collect();
        let handles: Vec<Backend> = memories.iter().map(|m| m.clone() as Backend).collect();

        let owner = credential("owner");
        let delegate = delegate(&owner, "delegate");
        let resolver = StaticChainResolver::new();
        resolver.register(owner.clone());
        resolver.register(delegate.clone());

        let vault = Vault::new(
            config,
            handles,
            Arc::new(prefix_classifier),
            Arc::new(resolver),
        )
        .unwrap_or_else(|e| panic!("invalid fixture config: {}", e));

        Self {
            vault,
            memories,
            owner,
            delegate,
            stranger: credential("stranger"),
        }
    }

    /// Remove every copy of the listed fragment indices.
    pub fn lose(&self, seed_id: &SeedId, indices: &[u32]) {
        for memory in &self.memories {
            for index in indices {
                memory.remove(seed_id, *index);
            }
        }
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Root credential from a string secret.
pub fn credential(secret: &str) -> Credential {
    Credential::try_from(secret).unwrap_or_else(|e| panic!("bad fixture credential: {}", e))
}

/// Delegate of `issuer`.
pub fn delegate(issuer: &Credential, tag: &str) -> Credential {
    issuer
        .delegate(tag)
        .unwrap_or_else(|e| panic!("bad fixture delegate: {}", e))
}

/// Seed id from a string.
pub fn seed(id: &str) -> SeedId {
    SeedId::new(id).unwrap_or_else(|e| panic!("bad fixture seed id: {}", e))
}

/// Backend that fails every call.
pub struct FailingBackend {
    name: String,
}

impl FailingBackend {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[async_trait]
impl StorageBackend for FailingBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, _: &SeedId, _: u32, _: &Fragment) -> scopevault_store::Result<()> {
        Err(StoreError::Backend(format!("{} is unavailable", self.name)))
    }

    async fn get(&self, _: &SeedId, _: u32) -> scopevault_store::Result<Fragment> {
        Err(StoreError::Backend(format!("{} is unavailable", self.name)))
    }
}

/// Memory backend that fails every `period`-th call (1-based).
pub struct FlakyBackend {
    inner: MemoryBackend,
    period: usize,
    calls: AtomicUsize,
}

impl FlakyBackend {
    pub fn new(name: impl Into<String>, period: usize) -> Self {
        Self {
            inner: MemoryBackend::new(name),
            period: period.max(1),
            calls: AtomicUsize::new(0),
        }
    }

    /// Calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryBackend {
        &self.inner
    }

    fn should_fail(&self) -> bool {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        call % self.period == 0
    }
}

#[async_trait]
impl StorageBackend for FlakyBackend {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn put(&self, seed_id: &SeedId, index: u32, fragment: &Fragment) -> scopevault_store::Result<()> {
        if self.should_fail() {
            return Err(StoreError::Backend("flaky put".into()));
        }
        self.inner.put(seed_id, index, fragment).await
    }

    async fn get(&self, seed_id: &SeedId, index: u32) -> scopevault_store::Result<Fragment> {
        if self.should_fail() {
            return Err(StoreError::Backend("flaky get".into()));
        }
        self.inner.get(seed_id, index).await
    }
}
