//! Per-call timeouts for any backend.

use std::time::Duration;

use async_trait::async_trait;
use scopevault_core::{Fragment, SeedId};

use crate::error::{Result, StoreError};
use crate::traits::StorageBackend;

/// Wraps a backend so every call fails with [`StoreError::Timeout`] once
/// `timeout` elapses. The timed-out call is dropped.
pub struct TimeoutBackend<B> {
    inner: B,
    timeout: Duration,
}

impl<B: StorageBackend> TimeoutBackend<B> {
    pub fn new(inner: B, timeout: Duration) -> Self {
        Self { inner, timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }

    fn elapsed(&self) -> StoreError {
        StoreError::Timeout {
            backend: self.inner.name().to_string(),
            millis: self.timeout.as_millis() as u64,
        }
    }
}

#[async_trait]
impl<B: StorageBackend> StorageBackend for TimeoutBackend<B> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn put(&self, seed_id: &SeedId, index: u32, fragment: &Fragment) -> Result<()> {
        tokio::time::timeout(self.timeout, self.inner.put(seed_id, index, fragment))
            .await
            .map_err(|_| self.elapsed())?
    }

    async fn get(&self, seed_id: &SeedId, index: u32) -> Result<Fragment> {
        tokio::time::timeout(self.timeout, self.inner.get(seed_id, index))
            .await
            .map_err(|_| self.elapsed())?
    }
}
