use scopevault_core::{
    ContentHash, Credential, Fragment, FragmentSetMetadata, KeyDomain, ScopeLabel, SealedBlob,
    SeedId,
};

pub fn seed(id: &str) -> SeedId {
    SeedId::new(id).unwrap()
}

pub fn fragment(id: &str, index: u32) -> Fragment {
    let credential = Credential::try_from("owner").unwrap();
    let key = credential
        .seal_key(KeyDomain::Chain, &ScopeLabel::fragment(index))
        .unwrap();

    Fragment {
        index,
        sealed: SealedBlob::seal(b"chunk list", &key).unwrap(),
        metadata: FragmentSetMetadata {
            seed_id: seed(id),
            total_fragments: 5,
            min_fragments: 3,
            total_chunks: 1,
            content_hash: ContentHash::hash(b"chunk list"),
            created_at: 1_736_870_400_000,
        },
    }
}
