//! Error types for the STOWAWAY protocol.

use thiserror::Error;

/// Errors in the crypto layer.
#[derive(Debug, Error)]
pub enum CryptoError {
    /// Tag or signature verification failed. The payload was tampered
    /// with or encoded under a different key.
    #[error("authentication failed: tag or signature did not verify")]
    Authentication,

    /// A key was bound to a suite expecting a different algorithm.
    #[error("algorithm mismatch: expected {expected}, got {received}")]
    AlgorithmMismatch {
        /// Algorithm the suite was built for.
        expected: &'static str,
        /// Algorithm the key is tagged with.
        received: &'static str,
    },

    /// Key material has the wrong shape for its algorithm tag.
    #[error("invalid key material: {0}")]
    InvalidKey(String),

    /// The operation needs the private half of a keypair that only
    /// carries its public half.
    #[error("private key required but only the public half is present")]
    MissingPrivateKey,

    /// AEAD encryption failed.
    #[error("encryption failed")]
    EncryptionFailed,
}

/// Errors in the codec layer (framing, joining, versioning).
#[derive(Debug, Error)]
pub enum CodecError {
    /// Malformed section count or unparseable structure.
    #[error("invalid format: {0}")]
    Format(String),

    /// Payload claims a version this build does not speak.
    #[error("unsupported payload version: expected {expected}, received {received}")]
    Version {
        /// Version this build speaks.
        expected: u8,
        /// Version the payload claims.
        received: u8,
    },

    /// Crypto failure while decoding sections.
    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

/// Errors in the link layer.
#[derive(Debug, Error)]
pub enum LinkError {
    /// Record store unavailable or a write failed.
    #[error("storage failure: {0}")]
    Storage(String),

    /// A matched link code was already past its timeout.
    #[error("link code expired")]
    Expired,
}

/// Top-level STOWAWAY errors.
#[derive(Debug, Error)]
pub enum StowawayError {
    /// Crypto error.
    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    /// Codec error.
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    /// Link error.
    #[error("link error: {0}")]
    Link(#[from] LinkError),

    /// Payload timestamp outside the accepted freshness window.
    #[error("stale handshake: payload timestamp outside the accepted window")]
    StaleHandshake,

    /// Handshake was already handled once within the replay window.
    #[error("replayed handshake")]
    ReplayedHandshake,
}
