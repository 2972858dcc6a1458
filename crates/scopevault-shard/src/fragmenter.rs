//! Splitting a serialized envelope into sealed fragments.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::debug;

use scopevault_core::{
    ContentHash, Credential, Fragment, FragmentSetMetadata, KeyDomain, ScopeLabel, SealedBlob,
    SeedId,
};

use crate::config::FragmentConfig;
use crate::error::{Result, ShardError};

/// One chunk as carried inside a fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ChunkEntry {
    pub index: u32,
    pub data: Bytes,
}

/// Encode a chunk list to CBOR.
pub(crate) fn encode_chunks(chunks: &[ChunkEntry]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    ciborium::into_writer(chunks, &mut buf)
        .map_err(|e| ShardError::Serialization(e.to_string()))?;
    Ok(buf)
}

/// Decode a CBOR chunk list.
pub(crate) fn decode_chunks(bytes: &[u8]) -> Result<Vec<ChunkEntry>> {
    ciborium::from_reader(bytes).map_err(|e| ShardError::Serialization(e.to_string()))
}

/// Sealing key for fragment `index`.
///
/// Fragment keys live in the chain domain: every credential of the owner's
/// chain can reassemble the envelope, and access is then decided scope by
/// scope when the envelope is opened.
pub(crate) fn fragment_key(
    credential: &Credential,
    index: u32,
) -> Result<scopevault_core::DerivedKey> {
    Ok(credential.seal_key(KeyDomain::Chain, &ScopeLabel::fragment(index))?)
}

/// Seal `chunks` as fragment `index` of the set described by `metadata`.
///
/// The index and metadata are bound as associated data, so a fragment whose
/// cleartext header was altered no longer opens.
pub(crate) fn seal_fragment(
    credential: &Credential,
    index: u32,
    metadata: &FragmentSetMetadata,
    chunks: &[ChunkEntry],
) -> Result<Fragment> {
    let key = fragment_key(credential, index)?;
    let sealed = SealedBlob::seal_with_aad(
        &encode_chunks(chunks)?,
        &key,
        &metadata.associated_data(index),
    )?;
    Ok(Fragment {
        index,
        sealed,
        metadata: metadata.clone(),
    })
}

/// Open a fragment sealed by [`seal_fragment`] against its own header.
pub(crate) fn open_fragment(fragment: &Fragment, credential: &Credential) -> Result<Vec<ChunkEntry>> {
    let key = fragment_key(credential, fragment.index)?;
    let plaintext = fragment
        .sealed
        .unseal_with_aad(&key, &fragment.metadata.associated_data(fragment.index))?;
    decode_chunks(&plaintext)
}

/// Splits serialized envelopes into `n` independently sealed fragments.
#[derive(Debug, Clone)]
pub struct Fragmenter {
    config: FragmentConfig,
}

impl Fragmenter {
    /// Create a fragmenter. Fails on an invalid config.
    pub fn new(config: FragmentConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &FragmentConfig {
        &self.config
    }

    /// Split `envelope` into fragments stamped with the current time.
    pub fn split(
        &self,
        seed_id: &SeedId,
        envelope: &[u8],
        credential: &Credential,
    ) -> Result<Vec<Fragment>> {
        let created_at = chrono::Utc::now().timestamp_millis();
        self.split_at(seed_id, envelope, credential, created_at)
    }

    /// Split with an explicit `created_at` (Unix milliseconds).
    pub fn split_at(
        &self,
        seed_id: &SeedId,
        envelope: &[u8],
        credential: &Credential,
        created_at: i64,
    ) -> Result<Vec<Fragment>> {
        let content = Bytes::copy_from_slice(envelope);
        let chunk_size = self.config.chunk_size;

        let chunks: Vec<Bytes> = (0..content.len())
            .step_by(chunk_size)
            .map(|start| content.slice(start..content.len().min(start + chunk_size)))
            .collect();
        let total_chunks = u32::try_from(chunks.len())
            .map_err(|_| ShardError::InvalidConfig("too many chunks for one set".into()))?;

        let metadata = FragmentSetMetadata {
            seed_id: seed_id.clone(),
            total_fragments: self.config.total_fragments,
            min_fragments: self.config.min_fragments,
            total_chunks,
            content_hash: ContentHash::hash(envelope),
            created_at,
        };

        let mut fragments = Vec::with_capacity(self.config.total_fragments as usize);
        for index in 0..self.config.total_fragments {
            let carried: Vec<ChunkEntry> = chunks
                .iter()
                .enumerate()
                .filter(|(c, _)| self.config.includes(index, *c as u32))
                .map(|(c, data)| ChunkEntry {
                    index: c as u32,
                    data: data.clone(),
                })
                .collect();

            fragments.push(seal_fragment(credential, index, &metadata, &carried)?);
        }

        debug!(
            seed_id = %seed_id,
            fragments = fragments.len(),
            chunks = total_chunks,
            "split envelope"
        );
        Ok(fragments)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seed() -> SeedId {
        SeedId::new("seed-1").unwrap()
    }

    #[test]
    fn test_split_shape() {
        let config = FragmentConfig::new(5, 3, 4).unwrap();
        let owner = Credential::try_from("owner").unwrap();
        let fragments = Fragmenter::new(config)
            .unwrap()
            .split_at(&seed(), b"0123456789", &owner, 42)
            .unwrap();

        assert_eq!(fragments.len(), 5);
        for (i, fragment) in fragments.iter().enumerate() {
            assert_eq!(fragment.index, i as u32);
            assert_eq!(fragment.metadata.total_chunks, 3);
            assert_eq!(fragment.metadata.total_fragments, 5);
            assert_eq!(fragment.metadata.min_fragments, 3);
            assert_eq!(fragment.metadata.created_at, 42);
            assert_eq!(fragment.metadata.content_hash, ContentHash::hash(b"0123456789"));
        }
    }

    #[test]
    fn test_fragment_contents_follow_inclusion_rule() {
        let config = FragmentConfig::new(5, 3, 1).unwrap();
        let owner = Credential::try_from("owner").unwrap();
        let fragments = Fragmenter::new(config)
            .unwrap()
            .split_at(&seed(), b"abcde", &owner, 0)
            .unwrap();

        let carried = |i: usize| -> Vec<u32> {
            open_fragment(&fragments[i], &owner)
                .unwrap()
                .iter()
                .map(|c| c.index)
                .collect()
        };

        assert_eq!(carried(0), vec![0, 1, 2, 3, 4]);
        assert_eq!(carried(2), vec![0, 1, 2, 3, 4]);
        assert_eq!(carried(3), vec![1, 3]);
        assert_eq!(carried(4), vec![0, 2, 4]);
    }

    #[test]
    fn test_empty_input_yields_zero_chunks() {
        let owner = Credential::try_from("owner").unwrap();
        let fragments = Fragmenter::new(FragmentConfig::default())
            .unwrap()
            .split(&seed(), b"", &owner)
            .unwrap();

        assert_eq!(fragments.len(), 5);
        assert!(fragments.iter().all(|f| f.metadata.total_chunks == 0));
    }

    #[test]
    fn test_fragments_sealed_under_distinct_keys() {
        let owner = Credential::try_from("owner").unwrap();
        let fragments = Fragmenter::new(FragmentConfig::default())
            .unwrap()
            .split(&seed(), b"payload", &owner)
            .unwrap();

        let key0 = fragment_key(&owner, 0).unwrap();
        let aad0 = fragments[0].metadata.associated_data(0);
        assert!(fragments[0].sealed.unseal_with_aad(&key0, &aad0).is_ok());
        assert!(fragments[1].sealed.unseal_with_aad(&key0, &aad0).is_err());

        let stranger = Credential::try_from("stranger").unwrap();
        assert!(open_fragment(&fragments[0], &stranger).is_err());
    }

    #[test]
    fn test_header_is_bound_to_the_seal() {
        let owner = Credential::try_from("owner").unwrap();
        let fragments = Fragmenter::new(FragmentConfig::default())
            .unwrap()
            .split(&seed(), b"payload", &owner)
            .unwrap();
        assert!(open_fragment(&fragments[0], &owner).is_ok());

        let mut relabelled = fragments[1].clone();
        relabelled.index = 0;
        assert!(open_fragment(&relabelled, &owner).is_err());

        let mut lowered = fragments[0].clone();
        lowered.metadata.min_fragments = 1;
        assert!(open_fragment(&lowered, &owner).is_err());

        let mut stretched = fragments[0].clone();
        stretched.metadata.total_chunks = u32::MAX;
        assert!(open_fragment(&stretched, &owner).is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = FragmentConfig {
            total_fragments: 2,
            min_fragments: 3,
            chunk_size: 8,
        };
        assert!(matches!(
            Fragmenter::new(config),
            Err(ShardError::InvalidConfig(_))
        ));
    }
}
