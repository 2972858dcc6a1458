//! End-to-end scenarios: write through the vault, lose fragments and
//! backends, read back with owners, delegates and strangers.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use scopevault::core::{Credential, Fragment, ScopeLabel, SeedId};
use scopevault::dist::{Backend, Placement};
use scopevault::envelope::{Classifier, Document, Envelope, NoChain, StaticChainResolver};
use scopevault::shard::{FragmentConfig, Fragmenter, Reconstructor, ShardError};
use scopevault::store::{MemoryBackend, SqliteBackend, StorageBackend, StoreError};
use scopevault::{ReadOutcome, Vault, VaultConfig, VaultError};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn doc(value: Value) -> Document {
    value.as_object().cloned().unwrap_or_default()
}

/// `b` is released, everything else restricted.
fn by_name(field: &str, _: &Value) -> ScopeLabel {
    if field == "b" {
        ScopeLabel::released()
    } else {
        ScopeLabel::restricted()
    }
}

fn classifier() -> Arc<dyn Classifier> {
    Arc::new(by_name)
}

/// Backend that rejects every call.
struct Unreachable(&'static str);

#[async_trait]
impl StorageBackend for Unreachable {
    fn name(&self) -> &str {
        self.0
    }

    async fn put(&self, _: &SeedId, _: u32, _: &Fragment) -> scopevault::store::Result<()> {
        Err(StoreError::Backend("unreachable".into()))
    }

    async fn get(&self, _: &SeedId, _: u32) -> scopevault::store::Result<Fragment> {
        Err(StoreError::Backend("unreachable".into()))
    }
}

struct Setup {
    vault: Vault,
    memories: Vec<Arc<MemoryBackend>>,
}

fn setup(config: VaultConfig, backends: usize) -> Setup {
    let memories: Vec<Arc<MemoryBackend>> = (0..backends)
        .map(|i| Arc::new(MemoryBackend::new(format!("mem-{}", i))))
        .collect();
    let handles: Vec<Backend> = memories.iter().map(|m| m.clone() as Backend).collect();

    let vault = Vault::new(config, handles, classifier(), Arc::new(NoChain)).unwrap();
    Setup { vault, memories }
}

/// Remove every copy of the listed fragment indices.
fn lose(memories: &[Arc<MemoryBackend>], seed: &SeedId, indices: &[u32]) {
    for memory in memories {
        for index in indices {
            memory.remove(seed, *index);
        }
    }
}

#[tokio::test]
async fn owner_roundtrip_is_complete() {
    init_tracing();
    let Setup { vault, .. } = setup(VaultConfig::default(), 3);
    let owner = Credential::try_from("owner").unwrap();
    let seed = SeedId::new("doc-1").unwrap();
    let document = doc(json!({ "a": "1", "b": "2", "c": { "deep": [1, 2, 3] } }));

    let receipt = vault.write(&seed, &document, &owner).await.unwrap();
    assert_eq!(receipt.metadata.total_fragments, 5);
    assert_eq!(receipt.report.stored_indices().len(), 5);
    assert_eq!(receipt.report.succeeded.len(), 15);

    let opened = vault
        .read(&seed, &owner)
        .await
        .unwrap()
        .into_opened()
        .unwrap();
    assert_eq!(opened.data, document);
    assert!(opened.is_complete());
}

#[tokio::test]
async fn delegate_reads_released_half_only() {
    init_tracing();
    let Setup { vault, .. } = setup(VaultConfig::default(), 2);
    let owner = Credential::try_from("owner").unwrap();
    let delegate = owner.delegate("auditor").unwrap();
    let seed = SeedId::new("doc-2").unwrap();

    vault
        .write(&seed, &doc(json!({ "a": "1", "b": "2" })), &owner)
        .await
        .unwrap();

    let opened = vault
        .read(&seed, &delegate)
        .await
        .unwrap()
        .into_opened()
        .unwrap();

    assert!((opened.completeness.percent() - 50.0).abs() < 1e-9);
    assert_eq!(opened.data.get("b"), Some(&json!("2")));
    assert!(!opened.data.contains_key("a"));
    assert!(opened.opened_scopes.contains(&ScopeLabel::released()));
    assert!(!opened.opened_scopes.contains(&ScopeLabel::restricted()));
}

#[tokio::test]
async fn resolver_lets_delegate_borrow_owner_scopes() {
    init_tracing();
    let owner = Credential::try_from("owner").unwrap();
    let delegate = owner.delegate("auditor").unwrap();

    let resolver = StaticChainResolver::new();
    resolver.register(owner.clone());
    resolver.register(delegate.clone());

    let memory: Backend = Arc::new(MemoryBackend::new("mem"));
    let vault = Vault::new(
        VaultConfig::default(),
        vec![memory],
        classifier(),
        Arc::new(resolver),
    )
    .unwrap();

    let seed = SeedId::new("doc-3").unwrap();
    let document = doc(json!({ "a": "1", "b": "2" }));
    vault.write(&seed, &document, &owner).await.unwrap();

    let opened = vault
        .read(&seed, &delegate)
        .await
        .unwrap()
        .into_opened()
        .unwrap();
    assert!(opened.is_complete());
    assert_eq!(opened.data, document);
}

#[tokio::test]
async fn stranger_cannot_reassemble() {
    init_tracing();
    let Setup { vault, .. } = setup(VaultConfig::default(), 2);
    let owner = Credential::try_from("owner").unwrap();
    let stranger = Credential::try_from("stranger").unwrap();
    let seed = SeedId::new("doc-4").unwrap();

    vault
        .write(&seed, &doc(json!({ "a": "1" })), &owner)
        .await
        .unwrap();

    let result = vault.read(&seed, &stranger).await;
    assert!(matches!(
        result,
        Err(VaultError::InsufficientFragments { required: 3, available: 0 })
    ));
}

#[tokio::test]
async fn survives_losing_fragments_down_to_a_good_threshold_subset() {
    init_tracing();
    let Setup { vault, memories } = setup(VaultConfig::default(), 2);
    let owner = Credential::try_from("owner").unwrap();
    let seed = SeedId::new("doc-5").unwrap();
    let document = doc(json!({ "a": "1", "b": "2" }));

    vault.write(&seed, &document, &owner).await.unwrap();

    // Keep {1, 3, 4}.
    lose(&memories, &seed, &[0, 2]);
    let opened = vault
        .read(&seed, &owner)
        .await
        .unwrap()
        .into_opened()
        .unwrap();
    assert_eq!(opened.data, document);

    // Keep {4} only.
    lose(&memories, &seed, &[1, 3]);
    assert!(matches!(
        vault.read(&seed, &owner).await,
        Err(VaultError::InsufficientFragments { required: 3, available: 1 })
    ));
}

#[tokio::test]
async fn rewritten_headers_on_a_backend_are_rejected() {
    init_tracing();
    let Setup { vault, memories } = setup(VaultConfig::default(), 1);
    let owner = Credential::try_from("owner").unwrap();
    let seed = SeedId::new("doc-5b").unwrap();

    vault
        .write(&seed, &doc(json!({ "a": "1", "b": "2" })), &owner)
        .await
        .unwrap();

    // One fragment left, its header lowered to a threshold of one.
    lose(&memories, &seed, &[0, 1, 2, 3]);
    let mut last = memories[0].remove(&seed, 4).unwrap();
    last.metadata.min_fragments = 1;
    last.metadata.total_chunks = u32::MAX;
    memories[0].put(&seed, 4, &last).await.unwrap();

    assert!(matches!(
        vault.read(&seed, &owner).await,
        Err(VaultError::InsufficientFragments { available: 0, .. })
    ));
}

#[tokio::test]
async fn partial_read_reports_missing_chunks() {
    init_tracing();
    let config = VaultConfig {
        fragments: FragmentConfig::new(6, 2, 8).unwrap(),
        ..Default::default()
    };
    let Setup { vault, memories } = setup(config, 1);
    let owner = Credential::try_from("owner").unwrap();
    let seed = SeedId::new("doc-6").unwrap();
    let document = doc(json!({ "a": "x".repeat(64), "b": "y".repeat(64) }));

    vault.write(&seed, &document, &owner).await.unwrap();

    // Only redundancy fragments 3 and 4 remain: a third of the chunks is gone.
    lose(&memories, &seed, &[0, 1, 2, 5]);

    match vault.read(&seed, &owner).await.unwrap() {
        ReadOutcome::Partial(reconstruction) => {
            assert!(!reconstruction.is_complete());
            assert!(!reconstruction.missing_chunks.is_empty());
            assert!(reconstruction.completeness.percent() > 0.0);
            assert_eq!(reconstruction.used_fragments, vec![3, 4]);
        }
        ReadOutcome::Opened(_) => panic!("expected a partial read"),
    }
}

#[tokio::test]
async fn tolerates_failing_backends() {
    init_tracing();
    let good = Arc::new(MemoryBackend::new("good"));
    let backends: Vec<Backend> = vec![
        Arc::new(Unreachable("down-1")),
        good.clone(),
        Arc::new(Unreachable("down-2")),
    ];
    let vault = Vault::new(VaultConfig::default(), backends, classifier(), Arc::new(NoChain)).unwrap();
    let owner = Credential::try_from("owner").unwrap();
    let seed = SeedId::new("doc-7").unwrap();
    let document = doc(json!({ "a": "1" }));

    let receipt = vault.write(&seed, &document, &owner).await.unwrap();
    assert_eq!(receipt.report.failed.len(), 10);
    assert_eq!(good.len(), 5);

    let opened = vault
        .read(&seed, &owner)
        .await
        .unwrap()
        .into_opened()
        .unwrap();
    assert_eq!(opened.data, document);
}

#[tokio::test]
async fn write_fails_when_too_few_fragments_land() {
    init_tracing();
    let backends: Vec<Backend> = vec![Arc::new(Unreachable("down-1")), Arc::new(Unreachable("down-2"))];
    let vault = Vault::new(VaultConfig::default(), backends, classifier(), Arc::new(NoChain)).unwrap();
    let owner = Credential::try_from("owner").unwrap();
    let seed = SeedId::new("doc-8").unwrap();

    let result = vault.write(&seed, &doc(json!({ "a": "1" })), &owner).await;
    assert!(matches!(
        result,
        Err(VaultError::InsufficientFragments { required: 3, available: 0 })
    ));
}

#[tokio::test]
async fn round_robin_spreads_fragments() {
    init_tracing();
    let config = VaultConfig {
        placement: Placement::RoundRobin,
        ..Default::default()
    };
    let Setup { vault, memories } = setup(config, 3);
    let owner = Credential::try_from("owner").unwrap();
    let seed = SeedId::new("doc-9").unwrap();
    let document = doc(json!({ "a": "1", "b": "2" }));

    vault.write(&seed, &document, &owner).await.unwrap();

    assert_eq!(memories[0].indices(&seed), vec![0, 3]);
    assert_eq!(memories[1].indices(&seed), vec![1, 4]);
    assert_eq!(memories[2].indices(&seed), vec![2]);

    let opened = vault
        .read(&seed, &owner)
        .await
        .unwrap()
        .into_opened()
        .unwrap();
    assert_eq!(opened.data, document);
}

#[tokio::test]
async fn sqlite_backends_on_disk() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let owner = Credential::try_from("owner").unwrap();
    let seed = SeedId::new("doc-10").unwrap();
    let document = doc(json!({ "a": "1", "b": "2" }));

    let open = |name: &str| -> Backend {
        Arc::new(SqliteBackend::open(dir.path().join(name)).unwrap())
    };

    {
        let vault = Vault::new(
            VaultConfig::default(),
            vec![open("a.db"), open("b.db")],
            classifier(),
            Arc::new(NoChain),
        )
        .unwrap();
        vault.write(&seed, &document, &owner).await.unwrap();
    }

    // Reopen with only one of the two files.
    let vault = Vault::new(VaultConfig::default(), vec![open("b.db")], classifier(), Arc::new(NoChain)).unwrap();
    let opened = vault
        .read(&seed, &owner)
        .await
        .unwrap()
        .into_opened()
        .unwrap();
    assert_eq!(opened.data, document);
}

#[test]
fn threshold_subsets_of_the_reference_envelope() {
    let owner = Credential::try_from("owner").unwrap();
    let envelope = Envelope::create(&doc(json!({ "a": "1", "b": "2" })), &owner, &by_name).unwrap();
    let bytes = envelope.to_bytes().unwrap();

    let fragments = Fragmenter::new(FragmentConfig::new(5, 3, 16).unwrap())
        .unwrap()
        .split(&SeedId::new("reference").unwrap(), &bytes, &owner)
        .unwrap();
    let pick = |indices: &[usize]| -> Vec<Fragment> {
        indices.iter().map(|i| fragments[*i].clone()).collect()
    };

    let result = Reconstructor::new().reconstruct(&pick(&[1, 3, 4]), &owner).unwrap();
    assert!(result.is_complete());
    assert_eq!(result.data, bytes);
    assert_eq!(Envelope::from_bytes(&result.data).unwrap(), envelope);

    assert!(matches!(
        Reconstructor::new().reconstruct(&pick(&[2, 4]), &owner),
        Err(ShardError::InsufficientFragments { .. })
    ));
}

#[test]
fn invalid_vault_configs_rejected() {
    let none: Vec<Backend> = Vec::new();
    assert!(matches!(
        Vault::new(VaultConfig::default(), none, classifier(), Arc::new(NoChain)),
        Err(VaultError::InvalidConfig(_))
    ));

    let config = VaultConfig {
        fragments: FragmentConfig {
            total_fragments: 2,
            min_fragments: 3,
            chunk_size: 16,
        },
        ..Default::default()
    };
    let memory: Backend = Arc::new(MemoryBackend::default());
    assert!(matches!(
        Vault::new(config, vec![memory], classifier(), Arc::new(NoChain)),
        Err(VaultError::InvalidConfig(_))
    ));
}
