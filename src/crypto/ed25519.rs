//! Ed25519 cipher suite.
//!
//! Provides integrity and authenticity without confidentiality: the
//! plaintext travels in the clear next to its signature. Useful where the
//! channel is already private but the payload origin must be provable.

use ed25519_dalek::{Signature, Signer, SigningKey, VerifyingKey};

use crate::core::{CodecError, CryptoError, SIGNATURE_SIZE};

use super::{Algorithm, CipherKey, ensure_section_count};

/// Signature suite bound to one Ed25519 keypair.
///
/// The private half is only needed for [`encode`](Self::encode);
/// verify-only deployments bind a [`CipherKey::verify_only`] key.
pub struct Ed25519Codec {
    signing: Option<SigningKey>,
    verifying: VerifyingKey,
}

impl Ed25519Codec {
    /// Bind a keypair, failing fast on an algorithm tag mismatch.
    pub fn init(key: &CipherKey) -> Result<Self, CryptoError> {
        key.ensure_algorithm(Algorithm::Ed25519)?;
        let (private, public) = key.keypair_parts()?;

        let verifying = VerifyingKey::from_bytes(public)
            .map_err(|e| CryptoError::InvalidKey(format!("bad Ed25519 public key: {e}")))?;
        let signing = private.map(SigningKey::from_bytes);

        if let Some(signing) = &signing {
            if signing.verifying_key() != verifying {
                return Err(CryptoError::InvalidKey(
                    "keypair halves do not belong together".into(),
                ));
            }
        }

        Ok(Self { signing, verifying })
    }

    /// Sign a plaintext. Returns `[plaintext, signature]`.
    pub fn encode(&self, plaintext: &[u8]) -> Result<Vec<Vec<u8>>, CryptoError> {
        let signing = self.signing.as_ref().ok_or(CryptoError::MissingPrivateKey)?;
        let signature = signing.sign(plaintext);
        Ok(vec![plaintext.to_vec(), signature.to_bytes().to_vec()])
    }

    /// Verify `[plaintext, signature]` and return the plaintext unchanged.
    pub fn decode(&self, sections: &[Vec<u8>]) -> Result<Vec<u8>, CodecError> {
        ensure_section_count("Ed25519", sections)?;

        let signature_bytes: &[u8; SIGNATURE_SIZE] =
            sections[1].as_slice().try_into().map_err(|_| {
                CodecError::Format(format!(
                    "Ed25519 signature must be {SIGNATURE_SIZE} bytes, got {}",
                    sections[1].len()
                ))
            })?;
        let signature = Signature::from_bytes(signature_bytes);

        self.verifying
            .verify_strict(&sections[0], &signature)
            .map_err(|_| CryptoError::Authentication)?;

        Ok(sections[0].clone())
    }
}
