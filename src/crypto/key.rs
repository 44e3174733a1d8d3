//! Key material handling.
//!
//! A [`CipherKey`] is opaque key material tagged with the algorithm it was
//! produced for. The tag is validated when the key is bound to a suite;
//! the core never interprets key bytes beyond a shape check. Private
//! material is zeroized on drop.

use rand::RngCore;
use rand::rngs::OsRng;
use zeroize::Zeroizing;

use crate::core::{AES_KEY_SIZE, CryptoError, ED25519_KEY_SIZE};

/// The closed set of supported algorithms.
///
/// Suites are selected at configuration time, one active algorithm per
/// deployment, not negotiated at runtime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// AES-256-GCM authenticated encryption.
    Aes256,
    /// Ed25519 signatures.
    Ed25519,
}

impl Algorithm {
    /// Stable name of the algorithm, as used in key files and errors.
    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Aes256 => "AES",
            Algorithm::Ed25519 => "Ed25519",
        }
    }

    /// Look an algorithm up by its stable name (case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("AES") {
            Some(Algorithm::Aes256)
        } else if name.eq_ignore_ascii_case("Ed25519") {
            Some(Algorithm::Ed25519)
        } else {
            None
        }
    }
}

impl std::fmt::Display for Algorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Key material, shaped per algorithm family.
#[derive(Clone)]
pub(crate) enum KeyMaterial {
    /// A symmetric secret.
    Symmetric(Zeroizing<Vec<u8>>),
    /// A signing keypair. The private half is absent for verify-only
    /// deployments.
    Keypair {
        private: Option<Zeroizing<[u8; ED25519_KEY_SIZE]>>,
        public: [u8; ED25519_KEY_SIZE],
    },
}

/// Opaque key material tagged with an algorithm identifier.
///
/// Immutable once bound to a [`CipherSuite`](super::CipherSuite); owned by
/// configuration or storage outside the core.
#[derive(Clone)]
pub struct CipherKey {
    algorithm: Algorithm,
    material: KeyMaterial,
}

impl CipherKey {
    /// Wrap a symmetric secret with its algorithm tag.
    pub fn symmetric(algorithm: Algorithm, bytes: Vec<u8>) -> Result<Self, CryptoError> {
        match algorithm {
            Algorithm::Aes256 => {
                if bytes.len() != AES_KEY_SIZE {
                    return Err(CryptoError::InvalidKey(format!(
                        "AES-256 key must be {AES_KEY_SIZE} bytes, got {}",
                        bytes.len()
                    )));
                }
            }
            Algorithm::Ed25519 => {
                return Err(CryptoError::InvalidKey(
                    "Ed25519 keys are keypairs, not symmetric secrets".into(),
                ));
            }
        }
        Ok(Self {
            algorithm,
            material: KeyMaterial::Symmetric(Zeroizing::new(bytes)),
        })
    }

    /// Wrap a full signing keypair with its algorithm tag.
    pub fn keypair(
        algorithm: Algorithm,
        private: [u8; ED25519_KEY_SIZE],
        public: [u8; ED25519_KEY_SIZE],
    ) -> Result<Self, CryptoError> {
        if algorithm != Algorithm::Ed25519 {
            return Err(CryptoError::InvalidKey(format!(
                "{algorithm} keys are not keypairs"
            )));
        }
        Ok(Self {
            algorithm,
            material: KeyMaterial::Keypair {
                private: Some(Zeroizing::new(private)),
                public,
            },
        })
    }

    /// Wrap only the public half of a keypair, for verify-only use.
    pub fn verify_only(
        algorithm: Algorithm,
        public: [u8; ED25519_KEY_SIZE],
    ) -> Result<Self, CryptoError> {
        if algorithm != Algorithm::Ed25519 {
            return Err(CryptoError::InvalidKey(format!(
                "{algorithm} keys have no public half"
            )));
        }
        Ok(Self {
            algorithm,
            material: KeyMaterial::Keypair {
                private: None,
                public,
            },
        })
    }

    /// Produce a fresh key for the given algorithm from the system's
    /// secure random source. Repeated calls yield distinct keys.
    pub fn generate(algorithm: Algorithm) -> Result<Self, CryptoError> {
        match algorithm {
            Algorithm::Aes256 => {
                let mut bytes = vec![0u8; AES_KEY_SIZE];
                OsRng.fill_bytes(&mut bytes);
                Self::symmetric(algorithm, bytes)
            }
            Algorithm::Ed25519 => {
                let signing = ed25519_dalek::SigningKey::generate(&mut OsRng);
                Self::keypair(
                    algorithm,
                    signing.to_bytes(),
                    signing.verifying_key().to_bytes(),
                )
            }
        }
    }

    /// The algorithm this key is tagged with.
    pub fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    /// Fail fast if this key is tagged for a different algorithm than the
    /// suite expects.
    pub(crate) fn ensure_algorithm(&self, expected: Algorithm) -> Result<(), CryptoError> {
        if self.algorithm != expected {
            return Err(CryptoError::AlgorithmMismatch {
                expected: expected.name(),
                received: self.algorithm.name(),
            });
        }
        Ok(())
    }

    pub(crate) fn symmetric_bytes(&self) -> Result<&[u8], CryptoError> {
        match &self.material {
            KeyMaterial::Symmetric(bytes) => Ok(bytes),
            KeyMaterial::Keypair { .. } => Err(CryptoError::InvalidKey(
                "expected symmetric key material".into(),
            )),
        }
    }

    pub(crate) fn keypair_parts(
        &self,
    ) -> Result<(Option<&[u8; ED25519_KEY_SIZE]>, &[u8; ED25519_KEY_SIZE]), CryptoError> {
        match &self.material {
            KeyMaterial::Keypair { private, public } => {
                Ok((private.as_ref().map(|p| &**p), public))
            }
            KeyMaterial::Symmetric(_) => Err(CryptoError::InvalidKey(
                "expected keypair key material".into(),
            )),
        }
    }
}

impl std::fmt::Debug for CipherKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print key bytes.
        f.debug_struct("CipherKey")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
