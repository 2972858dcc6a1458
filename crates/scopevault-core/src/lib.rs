//! # ScopeVault Core
//!
//! Pure primitives for ScopeVault: credentials, scope key derivation,
//! sealing, content digests and fragment wire types.
//!
//! This crate contains no I/O, no storage, no networking. Every operation is
//! synchronous and side-effect free apart from consuming secret material,
//! which is zeroed when dropped.
//!
//! ## Key Types
//!
//! - [`Credential`] - Opaque secret from which all keys of one owner derive
//! - [`ChainId`] - Short digest used only to test relatedness
//! - [`DerivedKey`] - Key material bound to `(credential, scope label)`
//! - [`SealedBlob`] - ChaCha20-Poly1305 ciphertext with its iv
//! - [`Fragment`] - One sealed, self-describing slice of an envelope
//!
//! ## Usage
//!
//! ```rust
//! use scopevault_core::{Credential, KeyDomain, ScopeLabel, SealedBlob};
//!
//! let credential = Credential::try_from("correct horse battery staple").unwrap();
//! let key = credential
//!     .seal_key(KeyDomain::Member, &ScopeLabel::restricted())
//!     .unwrap();
//!
//! let blob = SealedBlob::seal(b"payload", &key).unwrap();
//! assert_eq!(blob.unseal(&key).unwrap(), b"payload");
//! ```

pub mod completeness;
pub mod credential;
pub mod error;
pub mod fragment;
pub mod hash;
pub mod kdf;
pub mod scope;
pub mod sealer;

pub use completeness::Completeness;
pub use credential::{ChainId, Credential, KeyDomain, CHAIN_ID_LEN};
pub use error::{CoreError, Result};
pub use fragment::{Fragment, FragmentSetMetadata, SeedId};
pub use hash::ContentHash;
pub use kdf::{DerivedKey, KDF_SALT, MAX_OUTPUT_LEN, SEAL_KEY_LEN};
pub use scope::ScopeLabel;
pub use sealer::{SealAlgorithm, SealedBlob, IV_LEN};
