//! Scope key derivation.
//!
//! HKDF-SHA256 in extract-and-expand form: the extract step binds a fixed
//! application salt to the secret, the expand step chains HMAC blocks over
//! `(previous block, counter, info)` until the requested length is reached.
//!
//! Scope and fragment keys expand with info `scope/{label}`. Secrets a
//! credential derives for itself expand with info `internal/{purpose}`. The
//! two namespaces never overlap, so no scope label can name an internal
//! secret.

use hkdf::Hkdf;
use sha2::Sha256;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{CoreError, Result};
use crate::scope::ScopeLabel;

/// Application salt for the extract step.
pub const KDF_SALT: &[u8] = b"scopevault-v1/kdf-salt";

/// Info prefix for scope and fragment keys.
const SCOPE_INFO: &[u8] = b"scope/";

/// Info prefix for chain and delegate secrets.
const INTERNAL_INFO: &[u8] = b"internal/";

/// Largest output HKDF-SHA256 can expand to.
pub const MAX_OUTPUT_LEN: usize = 255 * 32;

/// Key length used for sealing (ChaCha20-Poly1305).
pub const SEAL_KEY_LEN: usize = 32;

/// Key material bound to a `(secret, label)` pair.
///
/// Zeroed when dropped. Debug output never shows the bytes.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct DerivedKey(Vec<u8>);

impl DerivedKey {
    /// Get the raw key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DerivedKey({} bytes)", self.0.len())
    }
}

/// Derive `output_len` bytes of key material for `label` from `secret`.
///
/// Deterministic. The caller guarantees `secret` is non-empty; credentials
/// enforce that at construction.
pub(crate) fn derive(secret: &[u8], label: &ScopeLabel, output_len: usize) -> Result<DerivedKey> {
    expand(secret, &[SCOPE_INFO, label.as_bytes()], output_len)
}

/// Derive a credential-internal secret for `purpose`.
pub(crate) fn derive_internal(secret: &[u8], purpose: &str, output_len: usize) -> Result<DerivedKey> {
    expand(secret, &[INTERNAL_INFO, purpose.as_bytes()], output_len)
}

fn expand(secret: &[u8], info: &[&[u8]], output_len: usize) -> Result<DerivedKey> {
    if output_len == 0 || output_len > MAX_OUTPUT_LEN {
        return Err(CoreError::InvalidKeyLength(output_len));
    }

    let hk = Hkdf::<Sha256>::new(Some(KDF_SALT), secret);
    let mut okm = DerivedKey(vec![0u8; output_len]);
    hk.expand_multi_info(info, &mut okm.0)
        .map_err(|_| CoreError::InvalidKeyLength(output_len))?;

    Ok(okm)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_derive_deterministic() {
        let label = ScopeLabel::restricted();
        let k1 = derive(b"secret", &label, 32).unwrap();
        let k2 = derive(b"secret", &label, 32).unwrap();
        assert_eq!(k1.as_bytes(), k2.as_bytes());
    }

    #[test]
    fn test_derive_label_separation() {
        let k1 = derive(b"secret", &ScopeLabel::released(), 32).unwrap();
        let k2 = derive(b"secret", &ScopeLabel::restricted(), 32).unwrap();
        let k3 = derive(b"secret", &ScopeLabel::fragment(0), 32).unwrap();
        assert_ne!(k1.as_bytes(), k2.as_bytes());
        assert_ne!(k1.as_bytes(), k3.as_bytes());
        assert_ne!(k2.as_bytes(), k3.as_bytes());
    }

    #[test]
    fn test_derive_exact_length() {
        let label = ScopeLabel::universal();
        assert_eq!(derive(b"s", &label, 1).unwrap().len(), 1);
        assert_eq!(derive(b"s", &label, 33).unwrap().len(), 33);
        assert_eq!(derive(b"s", &label, MAX_OUTPUT_LEN).unwrap().len(), MAX_OUTPUT_LEN);
    }

    #[test]
    fn test_shorter_output_is_prefix() {
        // Expand output is a stream: truncation must not change earlier bytes.
        let label = ScopeLabel::universal();
        let short = derive(b"secret", &label, 16).unwrap();
        let long = derive(b"secret", &label, 64).unwrap();
        assert_eq!(short.as_bytes(), &long.as_bytes()[..16]);
    }

    #[test]
    fn test_invalid_lengths_rejected() {
        let label = ScopeLabel::universal();
        assert!(matches!(
            derive(b"s", &label, 0),
            Err(CoreError::InvalidKeyLength(0))
        ));
        assert!(matches!(
            derive(b"s", &label, MAX_OUTPUT_LEN + 1),
            Err(CoreError::InvalidKeyLength(_))
        ));
    }

    #[test]
    fn test_scope_and_internal_namespaces_disjoint() {
        let scope = derive(b"secret", &ScopeLabel::new("chain-secret"), 32).unwrap();
        let internal = derive_internal(b"secret", "chain-secret", 32).unwrap();
        assert_ne!(scope.as_bytes(), internal.as_bytes());

        // A label spelling out the internal prefix still lands in the scope
        // namespace.
        let spoofed = derive(b"secret", &ScopeLabel::new("internal/chain-secret"), 32).unwrap();
        assert_ne!(spoofed.as_bytes(), internal.as_bytes());
    }

    #[test]
    fn test_debug_hides_key() {
        let key = derive(b"secret", &ScopeLabel::universal(), 32).unwrap();
        assert_eq!(format!("{:?}", key), "DerivedKey(32 bytes)");
    }

    proptest! {
        #[test]
        fn test_distinct_labels_give_distinct_keys(
            secret in prop::collection::vec(any::<u8>(), 1..64),
            a in "[a-z0-9-]{1,16}",
            b in "[a-z0-9-]{1,16}",
        ) {
            prop_assume!(a != b);

            let ka = derive(&secret, &ScopeLabel::new(a), SEAL_KEY_LEN).unwrap();
            let kb = derive(&secret, &ScopeLabel::new(b), SEAL_KEY_LEN).unwrap();
            prop_assert_ne!(ka.as_bytes(), kb.as_bytes());
        }

        #[test]
        fn test_distinct_secrets_give_distinct_keys(
            s1 in prop::collection::vec(any::<u8>(), 1..64),
            s2 in prop::collection::vec(any::<u8>(), 1..64),
        ) {
            prop_assume!(s1 != s2);

            let label = ScopeLabel::released();
            let k1 = derive(&s1, &label, SEAL_KEY_LEN).unwrap();
            let k2 = derive(&s2, &label, SEAL_KEY_LEN).unwrap();
            prop_assert_ne!(k1.as_bytes(), k2.as_bytes());
        }
    }
}
