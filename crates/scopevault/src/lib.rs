//! # ScopeVault
//!
//! Graduated-access encrypted storage for JSON documents.
//!
//! ## Overview
//!
//! A document is sealed into a partial envelope, serialized, split into
//! threshold fragments and spread over independent storage backends:
//!
//! - **Envelope**: the owner's credential opens everything; related
//!   credentials open the scopes their chain can derive
//! - **Fragments**: any suitable `k` of `n` fragments reassemble the
//!   envelope; fewer give an explicit partial result
//! - **Backends**: failures are tolerated as long as enough fragments land
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scopevault::{Vault, VaultConfig};
//! use scopevault::core::{Credential, SeedId};
//! use scopevault::dist::Backend;
//! use scopevault::envelope::{ExpiryClassifier, NoChain};
//! use scopevault::store::SqliteBackend;
//!
//! async fn example() {
//!     let backends: Vec<Backend> = vec![
//!         Arc::new(SqliteBackend::open("a.db").unwrap()),
//!         Arc::new(SqliteBackend::open("b.db").unwrap()),
//!     ];
//!     let vault = Vault::new(
//!         VaultConfig::default(),
//!         backends,
//!         Arc::new(ExpiryClassifier::new()),
//!         Arc::new(NoChain),
//!     )
//!     .unwrap();
//!
//!     let owner = Credential::try_from("owner secret").unwrap();
//!     let seed = SeedId::new("doc-1").unwrap();
//!     let document = serde_json::json!({ "name": "x" }).as_object().unwrap().clone();
//!
//!     vault.write(&seed, &document, &owner).await.unwrap();
//!     let outcome = vault.read(&seed, &owner).await.unwrap();
//!     assert!(outcome.opened().unwrap().is_complete());
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `scopevault::core` - Credentials, keys, sealing, fragment types
//! - `scopevault::envelope` - Classification and partial envelopes
//! - `scopevault::shard` - Fragmentation and reconstruction
//! - `scopevault::store` - Storage backends
//! - `scopevault::dist` - Distribution across backends

pub mod config;
pub mod error;
pub mod vault;

// Re-export component crates
pub use scopevault_core as core;
pub use scopevault_dist as dist;
pub use scopevault_envelope as envelope;
pub use scopevault_shard as shard;
pub use scopevault_store as store;

// Re-export main types for convenience
pub use config::VaultConfig;
pub use error::{Result, VaultError};
pub use vault::{ReadOutcome, Vault, WriteReceipt};

// Re-export commonly used component types
pub use scopevault_core::{Completeness, Credential, Fragment, FragmentSetMetadata, SeedId};
pub use scopevault_envelope::{Document, Envelope, OpenedDocument};
pub use scopevault_shard::Reconstruction;
