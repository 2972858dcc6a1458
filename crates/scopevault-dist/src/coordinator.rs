//! Fan-out of fragments to storage backends.
//!
//! Every `(fragment, backend)` call is issued concurrently and awaited
//! together. A failing or slow backend never aborts the others; its failure
//! is recorded in the report and the operation carries on.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use scopevault_core::{Fragment, SeedId};
use scopevault_store::StorageBackend;

use crate::config::DistributionConfig;
use crate::error::{DistError, Result};

/// Shared handle to a backend.
pub type Backend = Arc<dyn StorageBackend>;

/// A fragment stored on a backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placed {
    pub index: u32,
    pub backend: String,
}

/// A failed backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFailure {
    pub index: u32,
    pub backend: String,
    pub reason: String,
}

/// Outcome of [`DistributionCoordinator::store`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreReport {
    pub succeeded: Vec<Placed>,
    pub failed: Vec<CallFailure>,
}

impl StoreReport {
    /// Distinct fragment indices stored on at least one backend.
    pub fn stored_indices(&self) -> BTreeSet<u32> {
        self.succeeded.iter().map(|p| p.index).collect()
    }

    /// Whether every call succeeded.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of [`DistributionCoordinator::retrieve`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RetrieveReport {
    /// One fragment per index, sorted by index.
    pub fragments: Vec<Fragment>,
    /// Backend each returned fragment came from, by index.
    pub sources: BTreeMap<u32, String>,
    /// Calls that failed for reasons other than absence.
    pub failed: Vec<CallFailure>,
}

impl RetrieveReport {
    pub fn indices(&self) -> Vec<u32> {
        self.fragments.iter().map(|f| f.index).collect()
    }
}

/// Spreads fragments over backends and collects them back.
#[derive(Debug, Clone)]
pub struct DistributionCoordinator {
    config: DistributionConfig,
}

impl DistributionCoordinator {
    /// Create a coordinator. Fails on an invalid config.
    pub fn new(config: DistributionConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &DistributionConfig {
        &self.config
    }

    /// Store `fragments` according to the placement policy.
    pub async fn store(
        &self,
        seed_id: &SeedId,
        fragments: &[Fragment],
        backends: &[Backend],
    ) -> Result<StoreReport> {
        if backends.is_empty() {
            return Err(DistError::NoBackends);
        }

        let placement = self.config.placement;
        let calls = fragments.iter().flat_map(|fragment| {
            backends
                .iter()
                .enumerate()
                .filter(move |(b, _)| placement.places(fragment.index, *b, backends.len()))
                .map(move |(_, backend)| async move {
                    let result = backend.put(seed_id, fragment.index, fragment).await;
                    (fragment.index, backend.name().to_string(), result)
                })
        });

        let mut report = StoreReport::default();
        for (index, backend, result) in join_all(calls).await {
            match result {
                Ok(()) => report.succeeded.push(Placed { index, backend }),
                Err(e) => {
                    warn!(
                        seed_id = %seed_id,
                        index,
                        backend = %backend,
                        error = %e,
                        "fragment store failed"
                    );
                    report.failed.push(CallFailure {
                        index,
                        backend,
                        reason: e.to_string(),
                    });
                }
            }
        }

        info!(
            seed_id = %seed_id,
            stored = report.succeeded.len(),
            failed = report.failed.len(),
            "distributed fragments"
        );
        Ok(report)
    }

    /// Probe every backend for indices `0..total_fragments`.
    ///
    /// The first successful answer per index wins. Answers that do not
    /// belong to `(seed_id, index)` are discarded.
    pub async fn retrieve(&self, seed_id: &SeedId, backends: &[Backend]) -> Result<RetrieveReport> {
        if backends.is_empty() {
            return Err(DistError::NoBackends);
        }

        let calls = (0..self.config.total_fragments).flat_map(|index| {
            backends.iter().map(move |backend| async move {
                let result = backend.get(seed_id, index).await;
                (index, backend.name().to_string(), result)
            })
        });

        let mut found: BTreeMap<u32, Fragment> = BTreeMap::new();
        let mut report = RetrieveReport::default();

        for (index, backend, result) in join_all(calls).await {
            match result {
                Ok(fragment) => {
                    if fragment.index != index || &fragment.metadata.seed_id != seed_id {
                        warn!(
                            seed_id = %seed_id,
                            index,
                            backend = %backend,
                            "backend returned a fragment for another position"
                        );
                        continue;
                    }
                    if !found.contains_key(&index) {
                        found.insert(index, fragment);
                        report.sources.insert(index, backend);
                    }
                }
                Err(e) if e.is_not_found() => {
                    debug!(seed_id = %seed_id, index, backend = %backend, "fragment absent");
                }
                Err(e) => {
                    warn!(
                        seed_id = %seed_id,
                        index,
                        backend = %backend,
                        error = %e,
                        "fragment retrieve failed"
                    );
                    report.failed.push(CallFailure {
                        index,
                        backend,
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.fragments = found.into_values().collect();
        debug!(
            seed_id = %seed_id,
            retrieved = report.fragments.len(),
            failed = report.failed.len(),
            "retrieved fragments"
        );
        Ok(report)
    }
}
