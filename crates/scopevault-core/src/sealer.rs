//! Symmetric sealing of scope payloads.
//!
//! Uses ChaCha20-Poly1305 with a fresh random 96-bit nonce (the `iv`) per
//! call. The AEAD tag makes a wrong key, a wrong iv, or any truncation or
//! corruption fail as a whole: `unseal` never returns partial plaintext.
//!
//! The `_with_aad` variants bind associated data that travels in the clear
//! next to the blob. Opening with different associated data fails like a
//! wrong key.

use chacha20poly1305::{
    aead::{Aead, KeyInit, Payload},
    ChaCha20Poly1305, Nonce,
};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CoreError, Result};
use crate::kdf::DerivedKey;

/// Length of the per-seal nonce.
pub const IV_LEN: usize = 12;

/// Algorithm identifier carried with every sealed blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SealAlgorithm {
    /// ChaCha20-Poly1305 with a 256-bit key.
    #[serde(rename = "chacha20-poly1305")]
    ChaCha20Poly1305,
}

impl SealAlgorithm {
    pub fn as_str(&self) -> &'static str {
        match self {
            SealAlgorithm::ChaCha20Poly1305 => "chacha20-poly1305",
        }
    }
}

impl fmt::Display for SealAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one seal operation.
///
/// Serializes with hex-encoded byte fields:
/// `{ "encrypted": hex, "iv": hex, "algorithm": "chacha20-poly1305" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SealedBlob {
    /// Ciphertext including the authentication tag.
    #[serde(rename = "encrypted", with = "hex")]
    pub ciphertext: Vec<u8>,

    /// Nonce used for this seal (not secret).
    #[serde(with = "hex")]
    pub iv: [u8; IV_LEN],

    pub algorithm: SealAlgorithm,
}

impl SealedBlob {
    /// Seal `plaintext` under `key`.
    pub fn seal(plaintext: &[u8], key: &DerivedKey) -> Result<Self> {
        Self::seal_with_aad(plaintext, key, &[])
    }

    /// Seal `plaintext` under `key`, authenticating `aad` alongside it.
    pub fn seal_with_aad(plaintext: &[u8], key: &DerivedKey, aad: &[u8]) -> Result<Self> {
        let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
            .map_err(|_| CoreError::InvalidKeyLength(key.len()))?;

        let mut iv = [0u8; IV_LEN];
        rand::thread_rng().fill_bytes(&mut iv);

        let ciphertext = cipher
            .encrypt(
                Nonce::from_slice(&iv),
                Payload {
                    msg: plaintext,
                    aad,
                },
            )
            .map_err(|e| CoreError::EncryptionFailed(e.to_string()))?;

        Ok(Self {
            ciphertext,
            iv,
            algorithm: SealAlgorithm::ChaCha20Poly1305,
        })
    }

    /// Open this blob with `key`.
    ///
    /// Any failure is reported as [`CoreError::DecryptionFailed`].
    pub fn unseal(&self, key: &DerivedKey) -> Result<Vec<u8>> {
        self.unseal_with_aad(key, &[])
    }

    /// Open a blob sealed with [`SealedBlob::seal_with_aad`].
    pub fn unseal_with_aad(&self, key: &DerivedKey, aad: &[u8]) -> Result<Vec<u8>> {
        match self.algorithm {
            SealAlgorithm::ChaCha20Poly1305 => {
                let cipher = ChaCha20Poly1305::new_from_slice(key.as_bytes())
                    .map_err(|_| CoreError::DecryptionFailed)?;
                cipher
                    .decrypt(
                        Nonce::from_slice(&self.iv),
                        Payload {
                            msg: self.ciphertext.as_slice(),
                            aad,
                        },
                    )
                    .map_err(|_| CoreError::DecryptionFailed)
            }
        }
    }

    /// Try each candidate key in order, returning the first plaintext.
    pub fn unseal_any<'a>(&self, keys: impl IntoIterator<Item = &'a DerivedKey>) -> Result<Vec<u8>> {
        for key in keys {
            if let Ok(plaintext) = self.unseal(key) {
                return Ok(plaintext);
            }
        }
        Err(CoreError::DecryptionFailed)
    }

    /// Get the size of the ciphertext.
    pub fn ciphertext_len(&self) -> usize {
        self.ciphertext.len()
    }
}
