//! # ScopeVault Testkit
//!
//! Testing utilities for ScopeVault.
//!
//! ## Contents
//!
//! - [`fixtures`] - Ready-made vaults, credentials and faulty backends
//! - [`generators`] - Proptest strategies for documents, credentials, configs
//! - [`vectors`] - Golden key-derivation vectors

pub mod fixtures;
pub mod generators;
pub mod vectors;

pub use fixtures::{FailingBackend, FlakyBackend, TestFixture};
