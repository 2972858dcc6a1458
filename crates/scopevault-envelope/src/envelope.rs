//! Partial envelopes.
//!
//! One logical document is sealed twice in parallel: whole, under the
//! universal key, and split into scopes, each under its own key. The whole
//! copy keeps a single-key fast path for the owner; the scoped copies let a
//! lesser credential open part of the document without ever seeing the rest.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use scopevault_core::{Completeness, Credential, KeyDomain, ScopeLabel, SealedBlob};

use crate::chain::{related_members, ChainResolver};
use crate::classifier::Classifier;
use crate::error::{EnvelopeError, Result};

/// A flat, string-keyed map of JSON values.
pub type Document = Map<String, Value>;

/// A sealed document.
///
/// Older stored documents predate scoped sealing (`Full`) or encryption
/// altogether (`Legacy`); `open` handles each variant explicitly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "snake_case")]
pub enum Envelope {
    /// Whole-document seal only.
    Full { full: SealedBlob },

    /// Whole-document seal plus one seal per scope.
    Partial {
        full: SealedBlob,
        /// `None` for declared scopes that received no fields.
        scopes: BTreeMap<ScopeLabel, Option<SealedBlob>>,
        /// Field count of the original document.
        total_fields: u32,
    },

    /// Unencrypted document from before sealing existed.
    Legacy { document: Document },
}

/// Who opened a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opener {
    /// The credential passed to `open`.
    Primary,
    /// The related credential at this position of the related list.
    Related(usize),
}

/// Result of opening an envelope.
#[derive(Debug, Clone, PartialEq)]
pub struct OpenedDocument {
    /// Union of everything recovered.
    pub data: Document,
    /// Share of the original fields recovered.
    pub completeness: Completeness,
    /// Scopes that were opened. Contains `"*"` when the full seal opened.
    pub opened_scopes: BTreeSet<ScopeLabel>,
    /// Which credential opened each scope.
    pub opened_by: BTreeMap<ScopeLabel, Opener>,
}

impl OpenedDocument {
    fn complete(data: Document, scopes: Vec<ScopeLabel>) -> Self {
        let mut opened_scopes: BTreeSet<ScopeLabel> = scopes.into_iter().collect();
        opened_scopes.insert(ScopeLabel::universal());
        let opened_by = opened_scopes
            .iter()
            .map(|label| (label.clone(), Opener::Primary))
            .collect();

        Self {
            data,
            completeness: Completeness::FULL,
            opened_scopes,
            opened_by,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completeness.is_complete()
    }
}

impl Envelope {
    /// Classify `document` into scopes and seal it.
    ///
    /// The whole document is sealed under the credential's universal key;
    /// every non-empty scope bucket is sealed under its own key in the
    /// domain the classifier assigns. A classifier returning the universal
    /// label is treated as returning `restricted`.
    pub fn create(
        document: &Document,
        credential: &Credential,
        classifier: &dyn Classifier,
    ) -> Result<Self> {
        let full = seal_universal(document, credential)?;

        let mut buckets: BTreeMap<ScopeLabel, Document> = classifier
            .declared_scopes()
            .into_iter()
            .filter(|label| !label.is_universal())
            .map(|label| (label, Document::new()))
            .collect();

        for (field, value) in document {
            let mut label = classifier.classify(field, value);
            if label.is_universal() {
                label = ScopeLabel::restricted();
            }
            buckets
                .entry(label)
                .or_default()
                .insert(field.clone(), value.clone());
        }

        let mut scopes = BTreeMap::new();
        for (label, bucket) in buckets {
            if bucket.is_empty() {
                scopes.insert(label, None);
                continue;
            }

            let key = credential.seal_key(classifier.domain(&label), &label)?;
            let blob = SealedBlob::seal(&to_json(&bucket)?, &key)?;
            debug!(scope = %label, fields = bucket.len(), "sealed scope");
            scopes.insert(label, Some(blob));
        }

        Ok(Envelope::Partial {
            full,
            scopes,
            total_fields: document.len() as u32,
        })
    }

    /// Seal `document` under the universal key only.
    pub fn create_full(document: &Document, credential: &Credential) -> Result<Self> {
        Ok(Envelope::Full {
            full: seal_universal(document, credential)?,
        })
    }

    /// Wrap an unencrypted document.
    pub fn legacy(document: Document) -> Self {
        Envelope::Legacy { document }
    }

    /// Open as much of the envelope as `credential` and its relatives can.
    ///
    /// 1. the full seal under the universal key;
    /// 2. each populated scope under the credential's candidate keys;
    /// 3. each remaining scope under the candidate keys of every related
    ///    credential sharing the chain id.
    ///
    /// Fails with [`EnvelopeError::NoAccessibleData`] only when nothing at
    /// all could be opened.
    pub fn open(&self, credential: &Credential, related: &[Credential]) -> Result<OpenedDocument> {
        match self {
            Envelope::Legacy { document } => Ok(OpenedDocument::complete(document.clone(), Vec::new())),

            Envelope::Full { full } => match try_open_universal(full, credential)? {
                Some(document) => Ok(OpenedDocument::complete(document, Vec::new())),
                None => Err(EnvelopeError::NoAccessibleData),
            },

            Envelope::Partial {
                full,
                scopes,
                total_fields,
            } => {
                if let Some(document) = try_open_universal(full, credential)? {
                    return Ok(OpenedDocument::complete(document, scopes.keys().cloned().collect()));
                }

                open_scopes(scopes, *total_fields, credential, related)
            }
        }
    }

    /// Open with the related credentials `resolver` lists for `credential`.
    pub fn open_with(
        &self,
        credential: &Credential,
        resolver: &dyn ChainResolver,
    ) -> Result<OpenedDocument> {
        let related = resolver.list_related(credential);
        self.open(credential, &related)
    }

    /// Labels of the scopes this envelope records.
    pub fn scope_labels(&self) -> Vec<ScopeLabel> {
        match self {
            Envelope::Partial { scopes, .. } => scopes.keys().cloned().collect(),
            _ => Vec::new(),
        }
    }

    /// Serialize to CBOR bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        ciborium::into_writer(self, &mut buf)
            .map_err(|e| EnvelopeError::Serialization(e.to_string()))?;
        Ok(buf)
    }

    /// Deserialize from CBOR bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        ciborium::from_reader(bytes).map_err(|e| EnvelopeError::Serialization(e.to_string()))
    }
}

fn seal_universal(document: &Document, credential: &Credential) -> Result<SealedBlob> {
    let key = credential.seal_key(KeyDomain::Member, &ScopeLabel::universal())?;
    Ok(SealedBlob::seal(&to_json(document)?, &key)?)
}

fn try_open_universal(full: &SealedBlob, credential: &Credential) -> Result<Option<Document>> {
    let key = credential.seal_key(KeyDomain::Member, &ScopeLabel::universal())?;
    match full.unseal(&key) {
        Ok(plaintext) => Ok(Some(from_json(&plaintext)?)),
        Err(_) => {
            debug!("universal key did not open full seal");
            Ok(None)
        }
    }
}

fn open_scopes(
    scopes: &BTreeMap<ScopeLabel, Option<SealedBlob>>,
    total_fields: u32,
    credential: &Credential,
    related: &[Credential],
) -> Result<OpenedDocument> {
    let mut data = Document::new();
    let mut opened_by = BTreeMap::new();

    let populated: Vec<(&ScopeLabel, &SealedBlob)> = scopes
        .iter()
        .filter_map(|(label, blob)| blob.as_ref().map(|b| (label, b)))
        .collect();

    for (label, blob) in &populated {
        if let Some(fields) = try_open_scope(label, blob, credential)? {
            data.extend(fields);
            opened_by.insert((*label).clone(), Opener::Primary);
        }
    }

    for (position, relative) in related_members(credential, related) {
        for (label, blob) in &populated {
            if opened_by.contains_key(*label) {
                continue;
            }
            if let Some(fields) = try_open_scope(label, blob, relative)? {
                debug!(scope = %label, position, "related credential opened scope");
                data.extend(fields);
                opened_by.insert((*label).clone(), Opener::Related(position));
            }
        }
    }

    if data.is_empty() {
        return Err(EnvelopeError::NoAccessibleData);
    }

    Ok(OpenedDocument {
        completeness: Completeness::from_ratio(data.len(), total_fields as usize),
        opened_scopes: opened_by.keys().cloned().collect(),
        opened_by,
        data,
    })
}

fn try_open_scope(
    label: &ScopeLabel,
    blob: &SealedBlob,
    credential: &Credential,
) -> Result<Option<Document>> {
    let keys = credential.candidate_keys(label)?;
    match blob.unseal_any(&keys) {
        Ok(plaintext) => Ok(Some(from_json(&plaintext)?)),
        Err(_) => Ok(None),
    }
}

fn to_json(document: &Document) -> Result<Vec<u8>> {
    serde_json::to_vec(document).map_err(|e| EnvelopeError::Serialization(e.to_string()))
}

fn from_json(bytes: &[u8]) -> Result<Document> {
    serde_json::from_slice(bytes).map_err(|e| EnvelopeError::Serialization(e.to_string()))
}
