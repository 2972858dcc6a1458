//! Proptest generators for property-based testing.

use proptest::prelude::*;
use serde_json::Value;

use scopevault_core::{Credential, ScopeLabel};
use scopevault_envelope::Document;
use scopevault_shard::FragmentConfig;

/// Generate a non-empty credential secret and build the credential.
pub fn credential() -> impl Strategy<Value = Credential> {
    prop::collection::vec(any::<u8>(), 1..48).prop_filter_map("valid credential", |secret| {
        Credential::new(secret).ok()
    })
}

/// Generate a scope label.
pub fn scope_label() -> impl Strategy<Value = ScopeLabel> {
    prop_oneof![
        Just(ScopeLabel::released()),
        Just(ScopeLabel::restricted()),
        "[a-z]{1,10}".prop_map(ScopeLabel::new),
    ]
}

/// Generate a JSON leaf value.
pub fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "[ -~]{0,24}".prop_map(Value::from),
    ]
}

/// Generate a JSON value nested up to a few levels.
pub fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::from),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

/// Generate a document of up to `max_fields` top-level fields. Field names
/// starting with `pub_` are generated often enough to exercise release.
pub fn document(max_fields: usize) -> impl Strategy<Value = Document> {
    prop::collection::btree_map("(pub_)?[a-z]{1,8}", value(), 0..=max_fields)
        .prop_map(|fields| fields.into_iter().collect())
}

/// Generate a valid fragment config with small chunks.
pub fn fragment_config() -> impl Strategy<Value = FragmentConfig> {
    (1u32..=8)
        .prop_flat_map(|n| (Just(n), 1u32..=n, 1usize..=64))
        .prop_map(|(n, k, s)| FragmentConfig {
            total_fragments: n,
            min_fragments: k,
            chunk_size: s,
        })
}

/// Generate payload bytes of specified max length.
pub fn payload(max_len: usize) -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(any::<u8>(), 0..=max_len)
}
