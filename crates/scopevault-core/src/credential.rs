//! Credentials and chain identifiers.
//!
//! A credential holds two secrets:
//!
//! - the **member secret**, which is the credential's own key material, and
//! - the **chain secret**, which is shared by every credential in a chain.
//!
//! A root credential derives its chain secret from its member secret.
//! [`Credential::delegate`] issues a new member of the same chain: a fresh
//! member secret (derived one-way from the issuer's) and the inherited chain
//! secret. Delegates therefore share the issuer's [`ChainId`] and can derive
//! every chain-domain key, but none of the issuer's member-domain keys.

use serde::{Deserialize, Serialize};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};
use crate::kdf::{self, DerivedKey, SEAL_KEY_LEN};
use crate::scope::ScopeLabel;

/// Derive-key context for chain identifiers.
pub const CHAIN_ID_CONTEXT: &str = "scopevault-v1 chain-id";

/// Width of a chain identifier in bytes.
pub const CHAIN_ID_LEN: usize = 16;

/// Length of derived chain and delegate secrets.
const SECRET_LEN: usize = 32;

/// Which of a credential's secrets a key is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyDomain {
    /// Keys only this exact credential can derive.
    Member,
    /// Keys every credential of the chain can derive.
    Chain,
}

/// Short digest used to test whether two credentials are related.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChainId(pub [u8; CHAIN_ID_LEN]);

impl ChainId {
    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; CHAIN_ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Get the raw bytes.
    pub const fn as_bytes(&self) -> &[u8; CHAIN_ID_LEN] {
        &self.0
    }

    /// Convert to hex string.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Debug for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainId({})", self.to_hex())
    }
}

impl fmt::Display for ChainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// An opaque secret from which all keys of one owner are derived.
///
/// Never empty. Both secrets are zeroed on drop and never appear in Debug
/// output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct Credential {
    member: Vec<u8>,
    chain: Vec<u8>,
}

impl Credential {
    /// Create a root credential from secret bytes.
    pub fn new(secret: impl Into<Vec<u8>>) -> Result<Self> {
        let member = secret.into();
        if member.is_empty() {
            return Err(CoreError::InvalidCredential("empty credential".into()));
        }

        let chain = kdf::derive_internal(&member, "chain-secret", SECRET_LEN)?;
        Ok(Self {
            member,
            chain: chain.as_bytes().to_vec(),
        })
    }

    /// Rebuild a credential from both of its secrets.
    ///
    /// Used when the authorization layer hands out delegates.
    pub fn from_parts(member: impl Into<Vec<u8>>, chain: impl Into<Vec<u8>>) -> Result<Self> {
        let member = member.into();
        let chain = chain.into();
        if member.is_empty() || chain.is_empty() {
            return Err(CoreError::InvalidCredential(
                "credential secrets must not be empty".into(),
            ));
        }
        Ok(Self { member, chain })
    }

    /// Issue a new member of this credential's chain.
    ///
    /// The delegate's member secret is a one-way function of this
    /// credential's member secret and `tag`, so the issuer can always
    /// re-derive its delegates but a delegate cannot recover the issuer.
    pub fn delegate(&self, tag: &str) -> Result<Self> {
        let member = kdf::derive_internal(&self.member, &format!("delegate/{}", tag), SECRET_LEN)?;
        Ok(Self {
            member: member.as_bytes().to_vec(),
            chain: self.chain.clone(),
        })
    }

    /// Compute this credential's chain identifier.
    pub fn chain_id(&self) -> ChainId {
        let mut hasher = blake3::Hasher::new_derive_key(CHAIN_ID_CONTEXT);
        hasher.update(&self.chain);
        let digest = hasher.finalize();

        let mut id = [0u8; CHAIN_ID_LEN];
        id.copy_from_slice(&digest.as_bytes()[..CHAIN_ID_LEN]);
        ChainId(id)
    }

    /// Whether `other` belongs to the same chain.
    pub fn is_related(&self, other: &Credential) -> bool {
        self.chain_id() == other.chain_id()
    }

    /// Derive `output_len` bytes for `label` in the given key domain.
    pub fn derive(&self, domain: KeyDomain, label: &ScopeLabel, output_len: usize) -> Result<DerivedKey> {
        let secret = match domain {
            KeyDomain::Member => &self.member,
            KeyDomain::Chain => &self.chain,
        };
        kdf::derive(secret, label, output_len)
    }

    /// Derive a sealing key for `label` in the given key domain.
    pub fn seal_key(&self, domain: KeyDomain, label: &ScopeLabel) -> Result<DerivedKey> {
        self.derive(domain, label, SEAL_KEY_LEN)
    }

    /// Every sealing key this credential could hold for `label`.
    ///
    /// Member domain first, so the owner's own key is always tried before
    /// the shared one.
    pub fn candidate_keys(&self, label: &ScopeLabel) -> Result<[DerivedKey; 2]> {
        Ok([
            self.seal_key(KeyDomain::Member, label)?,
            self.seal_key(KeyDomain::Chain, label)?,
        ])
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Credential(chain={})", &self.chain_id().to_hex()[..8])
    }
}

impl TryFrom<&str> for Credential {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s.as_bytes())
    }
}

impl TryFrom<&[u8]> for Credential {
    type Error = CoreError;

    fn try_from(bytes: &[u8]) -> Result<Self> {
        Self::new(bytes)
    }
}

impl TryFrom<Vec<u8>> for Credential {
    type Error = CoreError;

    fn try_from(bytes: Vec<u8>) -> Result<Self> {
        Self::new(bytes)
    }
}
