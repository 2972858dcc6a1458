//! The Vault: seal, fragment, distribute and read back documents.

use std::sync::Arc;

use tracing::{debug, info};

use scopevault_core::{Credential, FragmentSetMetadata, SeedId};
use scopevault_dist::{Backend, DistributionCoordinator, StoreReport};
use scopevault_envelope::{ChainResolver, Classifier, Document, Envelope, OpenedDocument};
use scopevault_shard::{Fragmenter, Reconstruction, Reconstructor};

use crate::config::VaultConfig;
use crate::error::{Result, VaultError};

/// Outcome of [`Vault::write`].
#[derive(Debug, Clone)]
pub struct WriteReceipt {
    /// Metadata shared by every fragment of the written set.
    pub metadata: FragmentSetMetadata,
    /// Per-backend outcome of the distribution.
    pub report: StoreReport,
}

/// Outcome of [`Vault::read`].
#[derive(Debug, Clone)]
pub enum ReadOutcome {
    /// The envelope was reassembled and opened.
    Opened(OpenedDocument),
    /// Only part of the envelope could be reassembled. The bytes cannot be
    /// decoded, but the missing chunks are known.
    Partial(Reconstruction),
}

impl ReadOutcome {
    /// The opened document, if any.
    pub fn opened(&self) -> Option<&OpenedDocument> {
        match self {
            ReadOutcome::Opened(doc) => Some(doc),
            ReadOutcome::Partial(_) => None,
        }
    }

    pub fn into_opened(self) -> Option<OpenedDocument> {
        match self {
            ReadOutcome::Opened(doc) => Some(doc),
            ReadOutcome::Partial(_) => None,
        }
    }
}

/// The main Vault struct.
///
/// Ties together the envelope, fragmentation and distribution layers:
/// - `write` seals a document for one credential and spreads it out
/// - `read` collects what the backends still hold and opens as much as the
///   credential and its relatives can
pub struct Vault {
    config: VaultConfig,
    fragmenter: Fragmenter,
    reconstructor: Reconstructor,
    coordinator: DistributionCoordinator,
    backends: Vec<Backend>,
    classifier: Arc<dyn Classifier>,
    resolver: Arc<dyn ChainResolver>,
}

impl Vault {
    /// Create a vault over `backends`. Fails on an invalid config.
    pub fn new(
        config: VaultConfig,
        backends: Vec<Backend>,
        classifier: Arc<dyn Classifier>,
        resolver: Arc<dyn ChainResolver>,
    ) -> Result<Self> {
        config.validate()?;
        if backends.is_empty() {
            return Err(VaultError::InvalidConfig("no storage backends".into()));
        }

        Ok(Self {
            fragmenter: Fragmenter::new(config.fragments)?,
            reconstructor: Reconstructor::new(),
            coordinator: DistributionCoordinator::new(config.distribution())?,
            config,
            backends,
            classifier,
            resolver,
        })
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn backends(&self) -> &[Backend] {
        &self.backends
    }

    /// Seal `document` for `credential` and distribute it under `seed_id`.
    ///
    /// Fails with [`VaultError::InsufficientFragments`] when fewer distinct
    /// fragments than [`VaultConfig::required_stored`] landed on any backend.
    /// Fragments that did land are left in place.
    pub async fn write(
        &self,
        seed_id: &SeedId,
        document: &Document,
        credential: &Credential,
    ) -> Result<WriteReceipt> {
        let envelope = Envelope::create(document, credential, self.classifier.as_ref())?;
        let bytes = envelope.to_bytes()?;
        let fragments = self.fragmenter.split(seed_id, &bytes, credential)?;

        let metadata = fragments
            .first()
            .map(|f| f.metadata.clone())
            .ok_or_else(|| VaultError::InvalidConfig("fragmenter produced no fragments".into()))?;

        let report = self
            .coordinator
            .store(seed_id, &fragments, &self.backends)
            .await?;

        let required = self.config.required_stored();
        let stored = report.stored_indices().len() as u32;
        if stored < required {
            return Err(VaultError::InsufficientFragments {
                required,
                available: stored,
            });
        }

        info!(
            seed_id = %seed_id,
            fields = document.len(),
            bytes = bytes.len(),
            stored,
            "wrote document"
        );
        Ok(WriteReceipt { metadata, report })
    }

    /// Read back the document stored under `seed_id`.
    pub async fn read(&self, seed_id: &SeedId, credential: &Credential) -> Result<ReadOutcome> {
        let retrieved = self.coordinator.retrieve(seed_id, &self.backends).await?;
        debug!(
            seed_id = %seed_id,
            indices = ?retrieved.indices(),
            "collected fragments"
        );

        let reconstruction = self
            .reconstructor
            .reconstruct(&retrieved.fragments, credential)?;

        if !reconstruction.is_complete() {
            info!(
                seed_id = %seed_id,
                completeness = %reconstruction.completeness,
                missing = reconstruction.missing_chunks.len(),
                "partial read"
            );
            return Ok(ReadOutcome::Partial(reconstruction));
        }

        let envelope = Envelope::from_bytes(&reconstruction.data)?;
        let opened = self.open_envelope(&envelope, credential)?;

        info!(
            seed_id = %seed_id,
            completeness = %opened.completeness,
            scopes = opened.opened_scopes.len(),
            "read document"
        );
        Ok(ReadOutcome::Opened(opened))
    }

    /// Open an envelope with `credential` and the resolver's related
    /// credentials.
    pub fn open_envelope(&self, envelope: &Envelope, credential: &Credential) -> Result<OpenedDocument> {
        Ok(envelope.open_with(credential, self.resolver.as_ref())?)
    }
}
