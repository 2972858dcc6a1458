//! # ScopeVault Store
//!
//! Storage backends for sealed fragments.
//!
//! ## Overview
//!
//! A backend is an opaque key-value location addressed by `(seed id,
//! fragment index)`. The distribution layer talks to every backend through
//! the [`StorageBackend`] trait and never assumes more than `put`, `get` and
//! a name.
//!
//! ## Key Types
//!
//! - [`StorageBackend`] - The async trait for all backends
//! - [`SqliteBackend`] - SQLite-based persistent storage
//! - [`MemoryBackend`] - In-memory storage for tests and caches
//! - [`TimeoutBackend`] - Adapter bounding every call with a timeout
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::time::Duration;
//! use scopevault_store::{SqliteBackend, StorageBackend, TimeoutBackend};
//!
//! async fn example() {
//!     let backend = SqliteBackend::open("fragments.db").unwrap();
//!     let backend = TimeoutBackend::new(backend, Duration::from_secs(2));
//!     println!("using {}", backend.name());
//! }
//! ```

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod timeout;
pub mod traits;

#[cfg(test)]
mod test_util;

pub use error::{Result, StoreError};
pub use memory::MemoryBackend;
pub use sqlite::SqliteBackend;
pub use timeout::TimeoutBackend;
pub use traits::StorageBackend;
