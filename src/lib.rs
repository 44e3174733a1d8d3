//! # STOWAWAY Protocol
//!
//! STOWAWAY carries a secondary identity (issued by a different
//! authentication realm than the primary server protocol) through an
//! unrelated handshake's free-text field, cryptographically protected
//! against forgery and tampering, and later matches it against an
//! account-linking request so the two identities can be associated
//! persistently. It provides:
//!
//! - **Integrity**: AEAD or signature protection of the embedded payload;
//!   a forged or tampered payload is always an explicit rejection, never a
//!   silent downgrade to "no payload"
//! - **Transparency**: the payload is removed from the handshake string
//!   without disturbing the surrounding NUL-delimited fields
//! - **Ordering**: packets that race the asynchronous decode/verify/link
//!   pipeline are buffered and flushed in strict arrival order
//! - **Linking**: expiring link codes with atomic, exactly-once consumption
//!
//! ## Feature Flags
//!
//! - `crypto` (default): Cipher suites, key material and the payload codec
//! - `handshake` (default): Extraction pipeline and handshake handler
//! - `gate` (default): Packet order gate
//! - `link` (default): Link request store and linking service
//!
//! ## Modules
//!
//! - [`core`]: Constants and error types (always included)
//! - [`crypto`]: Cipher suites and key material (requires `crypto`)
//! - [`codec`]: Section joining, version sniffing, payload codec (requires `crypto`)
//! - [`identity`]: Versioned plaintext identity schema (requires `crypto`)
//! - [`handshake`]: Payload extraction and the handshake handler (requires `handshake`)
//! - [`gate`]: Packet order gate (requires `gate`)
//! - [`link`]: Link requests, stores and the linking service (requires `link`)
//!
//! ## Example Usage
//!
//! ```rust
//! use stowaway_protocol::prelude::*;
//!
//! # fn main() -> Result<(), StowawayError> {
//! // The proxy side encodes an identity into the handshake string.
//! let key = CipherKey::generate(Algorithm::Aes256)?;
//! let codec = PayloadCodec::new(CipherSuite::new(&key)?);
//!
//! let identity = BedrockIdentity::new(0x9876_5432_1098_7654, "Steve")
//!     .language("en_US")
//!     .ip("192.0.2.7");
//! let token = codec.encode_str(&identity.to_payload())?;
//! let handshake = format!("play.example.net\0{token}\0remainder");
//!
//! // The server side extracts and decodes it again.
//! let extractor = HandshakeExtractor::new(codec);
//! let extraction = extractor.extract(&handshake)?;
//!
//! let decoded = extraction.identity.expect("payload present");
//! assert_eq!(decoded.username, "Steve");
//! assert_eq!(extraction.hostname, "play.example.net\0remainder");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// Core module (always included)
pub mod core;

// Cipher suites and key material (feature-gated)
#[cfg(feature = "crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "crypto")))]
pub mod crypto;

// Section joining, version sniffing and the payload codec (feature-gated)
#[cfg(feature = "crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "crypto")))]
pub mod codec;

// Identity payload schema (feature-gated)
#[cfg(feature = "crypto")]
#[cfg_attr(docsrs, doc(cfg(feature = "crypto")))]
pub mod identity;

// Handshake extraction pipeline (feature-gated)
#[cfg(feature = "handshake")]
#[cfg_attr(docsrs, doc(cfg(feature = "handshake")))]
pub mod handshake;

// Packet order gate (feature-gated)
#[cfg(feature = "gate")]
#[cfg_attr(docsrs, doc(cfg(feature = "gate")))]
pub mod gate;

// Link request store and linking service (feature-gated)
#[cfg(feature = "link")]
#[cfg_attr(docsrs, doc(cfg(feature = "link")))]
pub mod link;

/// Prelude module for convenient imports.
pub mod prelude {
    // Core errors and constants
    pub use crate::core::*;

    // Crypto types (when enabled)
    #[cfg(feature = "crypto")]
    pub use crate::codec::{PayloadCodec, joiner, sniffer};
    #[cfg(feature = "crypto")]
    pub use crate::crypto::{Algorithm, CipherKey, CipherSuite};
    #[cfg(feature = "crypto")]
    pub use crate::identity::BedrockIdentity;

    // Handshake types (when enabled)
    #[cfg(feature = "handshake")]
    pub use crate::handshake::{
        AmbiguityPolicy, Extraction, HandshakeConfig, HandshakeExtractor, HandshakeHandler,
        HandshakeOutcome, IdentityRegistry,
    };

    // Gate types (when enabled)
    #[cfg(feature = "gate")]
    pub use crate::gate::{GateState, PacketGate, PacketSink};

    // Link types (when enabled)
    #[cfg(feature = "link")]
    pub use crate::link::{
        ConsumeMatch, ConsumeOutcome, LinkAuthority, LinkOutcome, LinkRequest, LinkRequestStore,
        LinkService, LinkedPlayer, LinkedPlayerStore, MemoryLinkStore, NoAuthority,
    };
}

// Re-export commonly used items at crate root
pub use crate::core::{CodecError, CryptoError, LinkError, StowawayError};

#[cfg(feature = "crypto")]
pub use codec::PayloadCodec;
#[cfg(feature = "crypto")]
pub use crypto::{Algorithm, CipherKey, CipherSuite};
#[cfg(feature = "crypto")]
pub use identity::BedrockIdentity;

#[cfg(feature = "handshake")]
pub use handshake::HandshakeExtractor;
