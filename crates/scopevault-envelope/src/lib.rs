//! # ScopeVault Envelope
//!
//! Graduated sealing of JSON documents.
//!
//! ## Overview
//!
//! A document is classified field by field into scopes. The envelope keeps
//! the whole document sealed under the owner's universal key and each scope
//! sealed under its own key, so that:
//!
//! - the owner opens everything with one key,
//! - a related credential opens the scopes its chain can derive,
//! - an unrelated credential opens nothing.
//!
//! ## Key Types
//!
//! - [`Envelope`] - Full, Partial or Legacy sealed document
//! - [`Classifier`] - Field-to-scope policy; [`ExpiryClassifier`] is the default
//! - [`ChainResolver`] - Source of related credentials
//! - [`OpenedDocument`] - Recovered fields with their completeness
//!
//! ## Usage
//!
//! ```rust
//! use scopevault_core::Credential;
//! use scopevault_envelope::{Envelope, ExpiryClassifier};
//! use serde_json::json;
//!
//! let owner = Credential::try_from("owner secret").unwrap();
//! let document = json!({ "lease": { "status": "ended" }, "notes": "private" });
//! let document = document.as_object().unwrap().clone();
//!
//! let envelope = Envelope::create(&document, &owner, &ExpiryClassifier::new()).unwrap();
//!
//! let viewer = owner.delegate("viewer").unwrap();
//! let opened = envelope.open(&viewer, &[]).unwrap();
//! assert!(opened.data.contains_key("lease"));
//! assert!(!opened.data.contains_key("notes"));
//! ```

pub mod chain;
pub mod classifier;
pub mod envelope;
pub mod error;

pub use chain::{related_members, ChainResolver, NoChain, StaticChainResolver};
pub use classifier::{default_domain, Classifier, ExpiryClassifier, EXPIRY_FIELDS, TERMINAL_STATUSES};
pub use envelope::{Document, Envelope, OpenedDocument, Opener};
pub use error::{EnvelopeError, Result};
