//! AES-256-GCM cipher suite.
//!
//! Encodes a plaintext into `[nonce, ciphertext‖tag]`. A fresh random
//! nonce is drawn per call; under a given key a nonce is never reused.

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use rand::RngCore;
use rand::rngs::OsRng;

use crate::core::{AEAD_NONCE_SIZE, CodecError, CryptoError};

use super::{Algorithm, CipherKey, ensure_section_count};

/// AEAD suite bound to one AES-256 key.
///
/// Stateless beyond the bound key; safe for unbounded concurrent use.
pub struct AesGcmCodec {
    cipher: Aes256Gcm,
}

impl AesGcmCodec {
    /// Bind a key, failing fast on an algorithm tag mismatch.
    pub fn init(key: &CipherKey) -> Result<Self, CryptoError> {
        key.ensure_algorithm(Algorithm::Aes256)?;
        let bytes = key.symmetric_bytes()?;
        Ok(Self {
            cipher: Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(bytes)),
        })
    }

    /// Encrypt and authenticate a plaintext.
    ///
    /// Returns `[nonce, ciphertext‖tag]`.
    pub fn encode(&self, plaintext: &[u8]) -> Result<Vec<Vec<u8>>, CryptoError> {
        let mut nonce = [0u8; AEAD_NONCE_SIZE];
        OsRng.fill_bytes(&mut nonce);

        let ciphertext = self
            .cipher
            .encrypt(Nonce::from_slice(&nonce), plaintext)
            .map_err(|_| CryptoError::EncryptionFailed)?;

        Ok(vec![nonce.to_vec(), ciphertext])
    }

    /// Authenticate and decrypt `[nonce, ciphertext‖tag]`.
    ///
    /// Fails with [`CryptoError::Authentication`] when the tag check
    /// fails; never returns altered plaintext.
    pub fn decode(&self, sections: &[Vec<u8>]) -> Result<Vec<u8>, CodecError> {
        ensure_section_count("AES", sections)?;

        let nonce = &sections[0];
        if nonce.len() != AEAD_NONCE_SIZE {
            return Err(CodecError::Format(format!(
                "AES nonce must be {AEAD_NONCE_SIZE} bytes, got {}",
                nonce.len()
            )));
        }

        self.cipher
            .decrypt(Nonce::from_slice(nonce), sections[1].as_slice())
            .map_err(|_| CryptoError::Authentication.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::AEAD_TAG_SIZE;

    fn suite() -> AesGcmCodec {
        AesGcmCodec::init(&CipherKey::generate(Algorithm::Aes256).unwrap()).unwrap()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let codec = suite();
        let sections = codec.encode(b"hello").unwrap();

        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].len(), AEAD_NONCE_SIZE);
        assert_eq!(sections[1].len(), 5 + AEAD_TAG_SIZE);

        assert_eq!(codec.decode(&sections).unwrap(), b"hello");
    }

    #[test]
    fn test_decode_with_wrong_key() {
        let sections = suite().encode(b"hello").unwrap();
        let other = suite();

        let err = other.decode(&sections).unwrap_err();
        assert!(matches!(err, CodecError::Crypto(CryptoError::Authentication)));
    }

    #[test]
    fn test_tamper_detection_any_bit() {
        let codec = suite();
        let sections = codec.encode(b"payload under test").unwrap();

        for section in 0..sections.len() {
            for byte in 0..sections[section].len() {
                let mut tampered = sections.clone();
                tampered[section][byte] ^= 0x01;
                assert!(
                    matches!(
                        codec.decode(&tampered),
                        Err(CodecError::Crypto(CryptoError::Authentication))
                    ),
                    "flipping section {section} byte {byte} must fail authentication"
                );
            }
        }
    }

    #[test]
    fn test_nonces_are_fresh_per_call() {
        let codec = suite();
        let a = codec.encode(b"x").unwrap();
        let b = codec.encode(b"x").unwrap();
        assert_ne!(a[0], b[0]);
        assert_ne!(a[1], b[1]);
    }

    #[test]
    fn test_wrong_section_count() {
        let codec = suite();
        let err = codec.decode(&[vec![0u8; 12]]).unwrap_err();
        assert!(matches!(err, CodecError::Format(_)));
    }

    #[test]
    fn test_init_rejects_wrong_algorithm() {
        let key = CipherKey::generate(Algorithm::Ed25519).unwrap();
        assert!(matches!(
            AesGcmCodec::init(&key),
            Err(CryptoError::AlgorithmMismatch { .. })
        ));
    }
}
