//! # ScopeVault Shard
//!
//! Threshold fragmentation of serialized envelopes.
//!
//! ## Overview
//!
//! [`Fragmenter`] cuts a byte string into fixed-size chunks and spreads them
//! over `n` fragments, each sealed under its own fragment key. The first `k`
//! fragments carry every chunk; the remaining fragments carry a strided share
//! for redundancy. [`Reconstructor`] reassembles whatever subset is supplied
//! and reports how much of the original it recovered.
//!
//! ## Key Types
//!
//! - [`FragmentConfig`] - `n`, `k` and chunk size, validated
//! - [`Fragmenter`] - Produces sealed [`Fragment`](scopevault_core::Fragment)s
//! - [`Reconstructor`] - Rebuilds bytes from fragments
//! - [`Reconstruction`] - Recovered bytes, completeness and missing chunks
//!
//! ## Usage
//!
//! ```rust
//! use scopevault_core::{Credential, SeedId};
//! use scopevault_shard::{FragmentConfig, Fragmenter, Reconstructor};
//!
//! let owner = Credential::try_from("owner").unwrap();
//! let seed = SeedId::new("doc-1").unwrap();
//!
//! let fragmenter = Fragmenter::new(FragmentConfig::default()).unwrap();
//! let fragments = fragmenter.split(&seed, b"serialized envelope", &owner).unwrap();
//!
//! let result = Reconstructor::new().reconstruct(&fragments[..3], &owner).unwrap();
//! assert!(result.is_complete());
//! assert_eq!(result.data, b"serialized envelope");
//! ```
//!
//! ## Design Notes
//!
//! - Not every `k`-subset recovers everything; see
//!   [`FragmentConfig::any_threshold_subset_recovers`].
//! - A complete reconstruction is always checked against the BLAKE3 content
//!   hash carried in the metadata.

pub mod config;
pub mod error;
pub mod fragmenter;
pub mod reconstructor;

pub use config::{FragmentConfig, MAX_FRAGMENTS};
pub use error::{Result, ShardError};
pub use fragmenter::Fragmenter;
pub use reconstructor::{Reconstruction, Reconstructor};
