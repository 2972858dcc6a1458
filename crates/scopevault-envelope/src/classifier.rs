//! Field classification.
//!
//! A classifier partitions the top-level fields of a document into scopes
//! and names the key domain each scope is sealed in. Nested values are
//! opaque leaves: only the field name and its value as a whole are seen.

use chrono::DateTime;
use serde_json::Value;

use scopevault_core::{KeyDomain, ScopeLabel};

/// Field names that carry an expiry or termination instant.
pub const EXPIRY_FIELDS: &[&str] = &[
    "expiresAt",
    "expires_at",
    "expiry",
    "endsAt",
    "ends_at",
    "terminatedAt",
    "terminated_at",
];

/// Status values that mark a field as terminal.
pub const TERMINAL_STATUSES: &[&str] = &[
    "expired",
    "terminated",
    "revoked",
    "completed",
    "closed",
    "ended",
    "cancelled",
];

/// Assigns document fields to scopes.
pub trait Classifier: Send + Sync {
    /// Scope for a top-level field.
    fn classify(&self, field: &str, value: &Value) -> ScopeLabel;

    /// Key domain a scope is sealed in.
    fn domain(&self, label: &ScopeLabel) -> KeyDomain {
        default_domain(label)
    }

    /// Scopes recorded in every envelope, even when empty.
    fn declared_scopes(&self) -> Vec<ScopeLabel> {
        vec![ScopeLabel::released(), ScopeLabel::restricted()]
    }
}

/// Released data is chain-accessible; every other scope is member-only.
pub fn default_domain(label: &ScopeLabel) -> KeyDomain {
    if label.as_str() == ScopeLabel::RELEASED {
        KeyDomain::Chain
    } else {
        KeyDomain::Member
    }
}

impl<F> Classifier for F
where
    F: Fn(&str, &Value) -> ScopeLabel + Send + Sync,
{
    fn classify(&self, field: &str, value: &Value) -> ScopeLabel {
        self(field, value)
    }
}

/// Default policy: lapsed or terminal fields are released, everything else
/// is restricted.
///
/// A field is released when its value is an object whose `status` is one of
/// [`TERMINAL_STATUSES`], or which carries one of [`EXPIRY_FIELDS`] holding
/// an instant (Unix ms number, digit string, or RFC 3339 string) at or
/// before `now`. Unparseable indicators count as not passed.
#[derive(Debug, Clone, Copy)]
pub struct ExpiryClassifier {
    now: i64,
}

impl ExpiryClassifier {
    /// Classify against the current wall clock.
    pub fn new() -> Self {
        Self {
            now: chrono::Utc::now().timestamp_millis(),
        }
    }

    /// Classify against a fixed instant (Unix milliseconds).
    pub fn at(now: i64) -> Self {
        Self { now }
    }

    /// The reference instant.
    pub fn now(&self) -> i64 {
        self.now
    }

    fn is_released(&self, value: &Value) -> bool {
        let Value::Object(map) = value else {
            return false;
        };

        if let Some(Value::String(status)) = map.get("status") {
            let status = status.to_ascii_lowercase();
            if TERMINAL_STATUSES.contains(&status.as_str()) {
                return true;
            }
        }

        EXPIRY_FIELDS
            .iter()
            .filter_map(|field| map.get(*field))
            .filter_map(parse_instant)
            .any(|instant| instant <= self.now)
    }
}

impl Default for ExpiryClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Classifier for ExpiryClassifier {
    fn classify(&self, _field: &str, value: &Value) -> ScopeLabel {
        if self.is_released(value) {
            ScopeLabel::released()
        } else {
            ScopeLabel::restricted()
        }
    }
}

/// Parse a JSON value as a Unix-millisecond instant.
fn parse_instant(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.parse::<i64>().ok().or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.timestamp_millis())
        }),
        _ => None,
    }
}
