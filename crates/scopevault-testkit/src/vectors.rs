//! Golden test vectors for key derivation.
//!
//! Every implementation must derive identical key bytes from the same
//! credential and label. Expected values are HKDF-SHA256 with salt
//! `scopevault-v1/kdf-salt` and info `scope/{label}`; chain and delegate
//! secrets use info `internal/chain-secret` and `internal/delegate/{tag}`.
//! Computed independently of this crate.

use scopevault_core::{Credential, KeyDomain, ScopeLabel};

/// Secret used by every vector.
pub const VECTOR_SECRET: &[u8] = b"correct horse battery staple";

/// A golden key-derivation vector.
#[derive(Debug, Clone)]
pub struct KeyVector {
    /// Human-readable name for the vector.
    pub name: &'static str,
    /// Delegate tag applied to the root credential first, if any.
    pub delegate: Option<&'static str>,
    pub domain: KeyDomain,
    pub label: &'static str,
    pub output_len: usize,
    /// Expected key bytes (hex).
    pub expected: &'static str,
}

/// Get all golden key vectors.
pub fn key_vectors() -> Vec<KeyVector> {
    vec![
        KeyVector {
            name: "universal key",
            delegate: None,
            domain: KeyDomain::Member,
            label: "*",
            output_len: 32,
            expected: "3ab7995d95a5020f0af3fa5dd608c9537d6e087a2b137c6ca41d6b24d828ed9a",
        },
        KeyVector {
            name: "restricted scope key",
            delegate: None,
            domain: KeyDomain::Member,
            label: "restricted",
            output_len: 32,
            expected: "cf5fde4c1a304825819c58c0e0eca9deda070b84f4f335466f9046abadf79863",
        },
        KeyVector {
            name: "restricted scope key, truncated",
            delegate: None,
            domain: KeyDomain::Member,
            label: "restricted",
            output_len: 16,
            expected: "cf5fde4c1a304825819c58c0e0eca9de",
        },
        KeyVector {
            name: "restricted scope key, two blocks",
            delegate: None,
            domain: KeyDomain::Member,
            label: "restricted",
            output_len: 64,
            expected: "cf5fde4c1a304825819c58c0e0eca9deda070b84f4f335466f9046abadf79863\
                       ec6fb9764823a6a92136551bbab2deb3c3d37484cac94639d753d400a1cedd87",
        },
        KeyVector {
            name: "released scope key",
            delegate: None,
            domain: KeyDomain::Chain,
            label: "released",
            output_len: 32,
            expected: "2423e2d081765d3993da49c211560f390e7b918f2dae10f25eb2879647b21e99",
        },
        KeyVector {
            name: "fragment 0 key",
            delegate: None,
            domain: KeyDomain::Chain,
            label: "fragment-0",
            output_len: 32,
            expected: "00217488408bcb9d8f542d0ed07b1d09a247e308b070f28b5cc1e8943dbd9abd",
        },
        KeyVector {
            name: "delegate shares released key",
            delegate: Some("auditor"),
            domain: KeyDomain::Chain,
            label: "released",
            output_len: 32,
            expected: "2423e2d081765d3993da49c211560f390e7b918f2dae10f25eb2879647b21e99",
        },
        KeyVector {
            name: "delegate member key",
            delegate: Some("auditor"),
            domain: KeyDomain::Member,
            label: "released",
            output_len: 32,
            expected: "72a338346cef4f5f2eaac756778df5c4a51fda54bdb85564075eda7e5ecc0eaf",
        },
    ]
}

/// Derive the key a vector describes, as hex.
pub fn derive_vector(vector: &KeyVector) -> scopevault_core::Result<String> {
    let root = Credential::new(VECTOR_SECRET)?;
    let credential = match vector.delegate {
        Some(tag) => root.delegate(tag)?,
        None => root,
    };
    let key = credential.derive(vector.domain, &ScopeLabel::new(vector.label), vector.output_len)?;
    Ok(hex::encode(key.as_bytes()))
}
