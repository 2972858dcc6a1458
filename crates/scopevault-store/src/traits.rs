//! StorageBackend trait: the abstract interface for fragment persistence.
//!
//! Backends are opaque key-value stores addressed by `(seed id, fragment
//! index)`. Implementations include SQLite and in-memory; remote services
//! plug in the same way.

use std::sync::Arc;

use async_trait::async_trait;
use scopevault_core::{Fragment, SeedId};

use crate::error::Result;

/// Async interface for one storage location.
///
/// # Design Notes
///
/// - **Overwrite on put**: storing at an occupied position replaces the
///   previous fragment.
/// - **Absence is an error**: `get` on an empty position returns
///   [`StoreError::NotFound`](crate::StoreError::NotFound).
/// - **No retries**: a failed call is reported once; callers decide what a
///   failure means.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Human-readable name used in reports and logs.
    fn name(&self) -> &str;

    /// Store `fragment` at `(seed_id, index)`.
    async fn put(&self, seed_id: &SeedId, index: u32, fragment: &Fragment) -> Result<()>;

    /// Fetch the fragment at `(seed_id, index)`.
    async fn get(&self, seed_id: &SeedId, index: u32) -> Result<Fragment>;
}

#[async_trait]
impl<B: StorageBackend + ?Sized> StorageBackend for Arc<B> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn put(&self, seed_id: &SeedId, index: u32, fragment: &Fragment) -> Result<()> {
        (**self).put(seed_id, index, fragment).await
    }

    async fn get(&self, seed_id: &SeedId, index: u32) -> Result<Fragment> {
        (**self).get(seed_id, index).await
    }
}
