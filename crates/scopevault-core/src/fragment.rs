//! Fragment wire types.
//!
//! A fragment is one independently sealed, self-describing slice of an
//! envelope. The persisted form is JSON and must stay stable across
//! implementations:
//!
//! ```text
//! {
//!   "index": 3,
//!   "encrypted": "<hex>",
//!   "iv": "<hex>",
//!   "algorithm": "chacha20-poly1305",
//!   "metadata": {
//!     "seedId": "...", "totalFragments": 5, "minFragments": 3,
//!     "totalChunks": 12, "contentHash": "<hex>", "createdAt": 1736870400000
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::hash::ContentHash;
use crate::sealer::SealedBlob;

/// Identifier of the logical document a fragment set belongs to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SeedId(String);

impl SeedId {
    /// Create a seed id. Must be non-empty.
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(CoreError::InvalidSeedId("empty seed id".into()));
        }
        Ok(Self(id))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeedId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for SeedId {
    type Error = CoreError;

    fn try_from(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<String> for SeedId {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self> {
        Self::new(s)
    }
}

impl From<SeedId> for String {
    fn from(id: SeedId) -> Self {
        id.0
    }
}

/// Domain tag leading every fragment's associated data.
const FRAGMENT_AAD_TAG: &[u8] = b"scopevault-v1/fragment";

/// Shape and integrity information shared by every fragment of a set.
///
/// Contains no secret material and travels unencrypted. Each fragment's seal
/// authenticates it together with the fragment index, see
/// [`FragmentSetMetadata::associated_data`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FragmentSetMetadata {
    pub seed_id: SeedId,
    pub total_fragments: u32,
    /// Threshold `k`; never larger than `total_fragments`.
    pub min_fragments: u32,
    pub total_chunks: u32,
    /// Digest of the serialized envelope before splitting.
    pub content_hash: ContentHash,
    /// Unix milliseconds.
    pub created_at: i64,
}

impl FragmentSetMetadata {
    /// Canonical associated data for fragment `index` of this set.
    ///
    /// Fixed big-endian layout: tag, index, seed id length and bytes,
    /// `total_fragments`, `min_fragments`, `total_chunks`, content hash,
    /// `created_at`.
    pub fn associated_data(&self, index: u32) -> Vec<u8> {
        let seed = self.seed_id.as_str().as_bytes();
        let mut aad = Vec::with_capacity(FRAGMENT_AAD_TAG.len() + seed.len() + 64);
        aad.extend_from_slice(FRAGMENT_AAD_TAG);
        aad.extend_from_slice(&index.to_be_bytes());
        aad.extend_from_slice(&(seed.len() as u64).to_be_bytes());
        aad.extend_from_slice(seed);
        aad.extend_from_slice(&self.total_fragments.to_be_bytes());
        aad.extend_from_slice(&self.min_fragments.to_be_bytes());
        aad.extend_from_slice(&self.total_chunks.to_be_bytes());
        aad.extend_from_slice(self.content_hash.as_bytes());
        aad.extend_from_slice(&self.created_at.to_be_bytes());
        aad
    }
}

/// One sealed fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub index: u32,

    /// The sealed chunk list.
    #[serde(flatten)]
    pub sealed: SealedBlob,

    pub metadata: FragmentSetMetadata,
}

impl Fragment {
    /// Serialize to the persisted JSON form.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    /// Parse the persisted JSON form.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sealer::{SealAlgorithm, IV_LEN};

    fn sample() -> Fragment {
        Fragment {
            index: 3,
            sealed: SealedBlob {
                ciphertext: vec![0xde, 0xad, 0xbe, 0xef],
                iv: [0x01; IV_LEN],
                algorithm: SealAlgorithm::ChaCha20Poly1305,
            },
            metadata: FragmentSetMetadata {
                seed_id: SeedId::new("session-42").unwrap(),
                total_fragments: 5,
                min_fragments: 3,
                total_chunks: 12,
                content_hash: ContentHash::from_bytes([0xab; 32]),
                created_at: 1736870400000,
            },
        }
    }

    #[test]
    fn test_persisted_format_field_names() {
        let json: serde_json::Value = serde_json::from_str(&sample().to_json().unwrap()).unwrap();

        assert_eq!(json["index"], 3);
        assert_eq!(json["encrypted"], "deadbeef");
        assert_eq!(json["iv"], "010101010101010101010101");
        assert_eq!(json["algorithm"], "chacha20-poly1305");

        let meta = &json["metadata"];
        assert_eq!(meta["seedId"], "session-42");
        assert_eq!(meta["totalFragments"], 5);
        assert_eq!(meta["minFragments"], 3);
        assert_eq!(meta["totalChunks"], 12);
        assert_eq!(meta["contentHash"], "ab".repeat(32));
        assert_eq!(meta["createdAt"], 1736870400000i64);
    }

    #[test]
    fn test_parse_persisted_form() {
        let fragment = sample();
        let parsed = Fragment::from_json(&fragment.to_json().unwrap()).unwrap();
        assert_eq!(parsed, fragment);
    }

    #[test]
    fn test_malformed_json_is_serialization_error() {
        assert!(matches!(
            Fragment::from_json("{\"index\": 1}"),
            Err(CoreError::Serialization(_))
        ));
    }

    #[test]
    fn test_associated_data_covers_every_field() {
        let metadata = sample().metadata;
        let base = metadata.associated_data(3);
        assert_eq!(base, metadata.clone().associated_data(3));
        assert_ne!(base, metadata.associated_data(4));

        let mut edits = Vec::new();
        let mut m = metadata.clone();
        m.seed_id = SeedId::new("session-43").unwrap();
        edits.push(m);
        let mut m = metadata.clone();
        m.total_fragments = 6;
        edits.push(m);
        let mut m = metadata.clone();
        m.min_fragments = 1;
        edits.push(m);
        let mut m = metadata.clone();
        m.total_chunks = u32::MAX;
        edits.push(m);
        let mut m = metadata.clone();
        m.content_hash = ContentHash::from_bytes([0; 32]);
        edits.push(m);
        let mut m = metadata;
        m.created_at = 0;
        edits.push(m);

        for edited in edits {
            assert_ne!(edited.associated_data(3), base, "{:?}", edited);
        }
    }

    #[test]
    fn test_empty_seed_id_rejected() {
        assert!(SeedId::new("").is_err());
        assert!(serde_json::from_str::<SeedId>("\"\"").is_err());
        assert_eq!(SeedId::try_from("doc-1").unwrap().as_str(), "doc-1");
    }
}
