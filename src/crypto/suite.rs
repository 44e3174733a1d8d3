//! Suite selection.
//!
//! The supported suites form a closed set selected at configuration time,
//! one active suite per deployment. `encode` and `decode` are mutual
//! inverses for any key produced for the same suite.

use crate::core::{CodecError, CryptoError, SECTION_COUNT};

use super::{AesGcmCodec, Algorithm, CipherKey, Ed25519Codec};

/// A cipher suite bound to one key.
///
/// Construct with [`CipherSuite::new`]; the variant is picked from the
/// key's algorithm tag.
pub enum CipherSuite {
    /// AES-256-GCM AEAD.
    Aes256Gcm(AesGcmCodec),
    /// Ed25519 signatures.
    Ed25519(Ed25519Codec),
}

impl CipherSuite {
    /// Bind the suite matching the key's algorithm tag.
    pub fn new(key: &CipherKey) -> Result<Self, CryptoError> {
        match key.algorithm() {
            Algorithm::Aes256 => AesGcmCodec::init(key).map(CipherSuite::Aes256Gcm),
            Algorithm::Ed25519 => Ed25519Codec::init(key).map(CipherSuite::Ed25519),
        }
    }

    /// The algorithm this suite implements.
    pub fn algorithm(&self) -> Algorithm {
        match self {
            CipherSuite::Aes256Gcm(_) => Algorithm::Aes256,
            CipherSuite::Ed25519(_) => Algorithm::Ed25519,
        }
    }

    /// Encode a plaintext into ordered binary sections.
    pub fn encode(&self, plaintext: &[u8]) -> Result<Vec<Vec<u8>>, CryptoError> {
        match self {
            CipherSuite::Aes256Gcm(codec) => codec.encode(plaintext),
            CipherSuite::Ed25519(codec) => codec.encode(plaintext),
        }
    }

    /// Decode ordered binary sections back into the plaintext.
    pub fn decode(&self, sections: &[Vec<u8>]) -> Result<Vec<u8>, CodecError> {
        match self {
            CipherSuite::Aes256Gcm(codec) => codec.decode(sections),
            CipherSuite::Ed25519(codec) => codec.decode(sections),
        }
    }
}

/// Every current suite produces exactly [`SECTION_COUNT`] sections.
pub(crate) fn ensure_section_count(name: &str, sections: &[Vec<u8>]) -> Result<(), CodecError> {
    if sections.len() != SECTION_COUNT {
        return Err(CodecError::Format(format!(
            "the {name} suite expects {SECTION_COUNT} sections, got {}. \
             Is the correct suite configured?",
            sections.len()
        )));
    }
    Ok(())
}
