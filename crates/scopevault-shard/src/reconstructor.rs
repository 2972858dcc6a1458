//! Reassembling fragments.

use std::collections::{BTreeMap, BTreeSet};

use bytes::{Bytes, BytesMut};
use tracing::{debug, warn};

use scopevault_core::{Completeness, ContentHash, Credential, Fragment, FragmentSetMetadata};

use crate::config::FragmentConfig;
use crate::error::{Result, ShardError};
use crate::fragmenter::{open_fragment, ChunkEntry};

/// Output of a reconstruction.
#[derive(Debug, Clone, PartialEq)]
pub struct Reconstruction {
    /// Recovered chunks concatenated in index order. Equals the original
    /// bytes when complete; gaps are skipped otherwise.
    pub data: Vec<u8>,
    pub completeness: Completeness,
    /// Chunk indices recovered, ascending.
    pub recovered_chunks: Vec<u32>,
    /// Chunk indices missing, ascending. Empty when complete.
    pub missing_chunks: Vec<u32>,
    /// Indices of the fragments that contributed.
    pub used_fragments: Vec<u32>,
    /// Metadata of the reconstructed set.
    pub metadata: FragmentSetMetadata,
}

impl Reconstruction {
    pub fn is_complete(&self) -> bool {
        self.completeness.is_complete()
    }
}

/// Reassembles fragments produced by [`Fragmenter`](crate::Fragmenter).
///
/// All parameters come from the fragments' own metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reconstructor;

impl Reconstructor {
    pub fn new() -> Self {
        Self
    }

    /// Recover as much of the original bytes as `fragments` allow.
    ///
    /// Every fragment is first opened against its own header; fragments that
    /// fail to unseal or decode are dropped with a warning. Of the rest, only
    /// the set held by the most distinct indices is kept, deduplicated by
    /// index. A complete result is checked against the recorded content hash.
    pub fn reconstruct(&self, fragments: &[Fragment], credential: &Credential) -> Result<Reconstruction> {
        let mut sorted: Vec<&Fragment> = fragments.iter().collect();
        sorted.sort_by_key(|f| f.index);

        let mut opened: Vec<(&Fragment, Vec<ChunkEntry>)> = Vec::with_capacity(sorted.len());
        for fragment in &sorted {
            match open_fragment(fragment, credential) {
                Ok(entries) => opened.push((*fragment, entries)),
                Err(e) => {
                    warn!(
                        seed_id = %fragment.metadata.seed_id,
                        index = fragment.index,
                        error = %e,
                        "dropping fragment that failed to open"
                    );
                }
            }
        }

        let Some(metadata) = majority_metadata(opened.iter().map(|(f, _)| *f)) else {
            // Nothing opened: report the threshold the headers claim.
            let required = majority_metadata(sorted.iter().copied())
                .map_or(1, |m| m.min_fragments.max(1));
            return Err(ShardError::InsufficientFragments {
                required,
                available: 0,
            });
        };
        let stride = FragmentConfig::new(metadata.total_fragments, metadata.min_fragments, 1)
            .map_err(|e| ShardError::MalformedSet(e.to_string()))?
            .stride();

        let mut used: Vec<(u32, Vec<ChunkEntry>)> = Vec::new();
        for (fragment, entries) in opened {
            if fragment.metadata != metadata {
                warn!(
                    seed_id = %metadata.seed_id,
                    index = fragment.index,
                    "dropping fragment from a different set"
                );
                continue;
            }
            if fragment.index >= metadata.total_fragments
                || used.last().is_some_and(|(index, _)| *index == fragment.index)
            {
                continue;
            }
            used.push((fragment.index, entries));
        }

        let required = metadata.min_fragments;
        if (used.len() as u32) < required {
            return Err(ShardError::InsufficientFragments {
                required,
                available: used.len() as u32,
            });
        }

        let mut chunks: BTreeMap<u32, Bytes> = BTreeMap::new();
        let mut used_fragments = Vec::with_capacity(used.len());
        for (index, entries) in used {
            used_fragments.push(index);
            for entry in entries {
                if entry.index >= metadata.total_chunks {
                    debug!(chunk = entry.index, "ignoring out-of-range chunk");
                    continue;
                }
                match chunks.get(&entry.index) {
                    Some(existing) if existing.len() >= entry.data.len() => {}
                    _ => {
                        chunks.insert(entry.index, entry.data);
                    }
                }
            }
        }

        // Any fragment of a genuine set carries at least
        // floor(total_chunks / stride) chunks.
        let bound = u64::from(stride) * (chunks.len() as u64 + 1);
        if u64::from(metadata.total_chunks) >= bound {
            return Err(ShardError::MalformedSet(format!(
                "set claims {} chunks but its fragments carry {}",
                metadata.total_chunks,
                chunks.len()
            )));
        }

        let recovered_chunks: Vec<u32> = chunks.keys().copied().collect();
        let missing_chunks: Vec<u32> = (0..metadata.total_chunks)
            .filter(|c| !chunks.contains_key(c))
            .collect();
        let completeness =
            Completeness::from_ratio(recovered_chunks.len(), metadata.total_chunks as usize);

        let mut data = BytesMut::new();
        for chunk in chunks.values() {
            data.extend_from_slice(chunk);
        }
        let data = data.to_vec();

        if completeness.is_complete() {
            let actual = ContentHash::hash(&data);
            if actual != metadata.content_hash {
                return Err(ShardError::IntegrityViolation {
                    expected: metadata.content_hash,
                    actual,
                });
            }
        } else {
            debug!(
                seed_id = %metadata.seed_id,
                completeness = %completeness,
                missing = missing_chunks.len(),
                "partial reconstruction"
            );
        }

        Ok(Reconstruction {
            data,
            completeness,
            recovered_chunks,
            missing_chunks,
            used_fragments,
            metadata,
        })
    }
}

/// Metadata held by the most distinct fragment indices; ties go to the set
/// seen first, i.e. the one holding the lowest index.
fn majority_metadata<'a>(fragments: impl IntoIterator<Item = &'a Fragment>) -> Option<FragmentSetMetadata> {
    let mut groups: Vec<(&FragmentSetMetadata, BTreeSet<u32>)> = Vec::new();
    for fragment in fragments {
        match groups.iter_mut().find(|(m, _)| **m == fragment.metadata) {
            Some((_, indices)) => {
                indices.insert(fragment.index);
            }
            None => groups.push((&fragment.metadata, BTreeSet::from([fragment.index]))),
        }
    }

    let mut best: Option<(&FragmentSetMetadata, usize)> = None;
    for (metadata, indices) in groups {
        if best.map_or(true, |(_, c)| indices.len() > c) {
            best = Some((metadata, indices.len()));
        }
    }
    best.map(|(metadata, _)| metadata.clone())
}
