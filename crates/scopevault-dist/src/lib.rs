//! # ScopeVault Dist
//!
//! Distribution of sealed fragments across independent storage backends.
//!
//! ## Overview
//!
//! The [`DistributionCoordinator`] issues one backend call per
//! `(fragment, backend)` pair, concurrently, and reports every success and
//! failure. Backend failures never fail the operation: the caller decides,
//! from the report, whether enough fragments landed.
//!
//! ## Key Types
//!
//! - [`DistributionCoordinator`] - Concurrent store and retrieve
//! - [`DistributionConfig`] / [`Placement`] - What to probe and where to place
//! - [`StoreReport`] / [`RetrieveReport`] - Per-call outcomes
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scopevault_core::SeedId;
//! use scopevault_dist::{Backend, DistributionConfig, DistributionCoordinator};
//! use scopevault_store::MemoryBackend;
//!
//! async fn example() {
//!     let backends: Vec<Backend> = vec![
//!         Arc::new(MemoryBackend::new("a")),
//!         Arc::new(MemoryBackend::new("b")),
//!     ];
//!     let coordinator = DistributionCoordinator::new(DistributionConfig::default()).unwrap();
//!
//!     let seed = SeedId::new("doc-1").unwrap();
//!     let report = coordinator.retrieve(&seed, &backends).await.unwrap();
//!     println!("found {} fragments", report.fragments.len());
//! }
//! ```

pub mod config;
pub mod coordinator;
pub mod error;

pub use config::{DistributionConfig, Placement, MAX_PROBED_FRAGMENTS};
pub use coordinator::{
    Backend, CallFailure, DistributionCoordinator, Placed, RetrieveReport, StoreReport,
};
pub use error::{DistError, Result};
