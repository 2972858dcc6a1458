//! In-memory implementation of the StorageBackend trait.
//!
//! Used by tests and as a local cache. Nothing is persisted.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use scopevault_core::{Fragment, SeedId};

use crate::error::{Result, StoreError};
use crate::traits::StorageBackend;

/// In-memory backend.
///
/// Thread-safe via RwLock.
pub struct MemoryBackend {
    name: String,
    fragments: RwLock<HashMap<(SeedId, u32), Fragment>>,
}

impl MemoryBackend {
    /// Create an empty backend called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fragments: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored fragments.
    pub fn len(&self) -> usize {
        self.fragments.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop the fragment at a position, returning it if present.
    pub fn remove(&self, seed_id: &SeedId, index: u32) -> Option<Fragment> {
        self.fragments
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&(seed_id.clone(), index))
    }

    /// Indices stored for `seed_id`, ascending.
    pub fn indices(&self, seed_id: &SeedId) -> Vec<u32> {
        let fragments = self.fragments.read().unwrap_or_else(|e| e.into_inner());
        let mut indices: Vec<u32> = fragments
            .keys()
            .filter(|(seed, _)| seed == seed_id)
            .map(|(_, index)| *index)
            .collect();
        indices.sort_unstable();
        indices
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new("memory")
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        &self.name
    }

    async fn put(&self, seed_id: &SeedId, index: u32, fragment: &Fragment) -> Result<()> {
        if fragment.index != index {
            return Err(StoreError::InvalidData(format!(
                "fragment {} stored at index {}",
                fragment.index, index
            )));
        }

        let mut fragments = self.fragments.write().unwrap_or_else(|e| e.into_inner());
        fragments.insert((seed_id.clone(), index), fragment.clone());
        Ok(())
    }

    async fn get(&self, seed_id: &SeedId, index: u32) -> Result<Fragment> {
        let fragments = self.fragments.read().unwrap_or_else(|e| e.into_inner());
        fragments
            .get(&(seed_id.clone(), index))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                seed_id: seed_id.to_string(),
                index,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_util::{fragment, seed};

    #[tokio::test]
    async fn test_put_get() {
        let backend = MemoryBackend::new("mem-a");
        let f = fragment("doc", 2);

        backend.put(&seed("doc"), 2, &f).await.unwrap();
        assert_eq!(backend.get(&seed("doc"), 2).await.unwrap(), f);
        assert_eq!(backend.len(), 1);
        assert_eq!(backend.name(), "mem-a");
    }

    #[tokio::test]
    async fn test_missing_is_not_found() {
        let backend = MemoryBackend::default();
        backend.put(&seed("doc"), 0, &fragment("doc", 0)).await.unwrap();

        let err = backend.get(&seed("doc"), 1).await.unwrap_err();
        assert!(err.is_not_found());
        let err = backend.get(&seed("other"), 0).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_put_overwrites() {
        let backend = MemoryBackend::default();
        let first = fragment("doc", 0);
        let mut second = fragment("doc", 0);
        second.metadata.created_at = 99;

        backend.put(&seed("doc"), 0, &first).await.unwrap();
        backend.put(&seed("doc"), 0, &second).await.unwrap();

        assert_eq!(backend.get(&seed("doc"), 0).await.unwrap(), second);
        assert_eq!(backend.len(), 1);
    }

    #[tokio::test]
    async fn test_index_mismatch_rejected() {
        let backend = MemoryBackend::default();
        let result = backend.put(&seed("doc"), 1, &fragment("doc", 0)).await;
        assert!(matches!(result, Err(StoreError::InvalidData(_))));
        assert!(backend.is_empty());
    }

    #[tokio::test]
    async fn test_remove_and_indices() {
        let backend = MemoryBackend::default();
        for i in [3, 0, 1] {
            backend.put(&seed("doc"), i, &fragment("doc", i)).await.unwrap();
        }
        assert_eq!(backend.indices(&seed("doc")), vec![0, 1, 3]);

        assert!(backend.remove(&seed("doc"), 1).is_some());
        assert!(backend.remove(&seed("doc"), 1).is_none());
        assert_eq!(backend.indices(&seed("doc")), vec![0, 3]);
    }
}
