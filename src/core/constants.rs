//! Protocol constants.
//!
//! These values are fixed by the wire format and MUST NOT be changed
//! without bumping [`PAYLOAD_VERSION`].

use std::time::Duration;

// =============================================================================
// PAYLOAD FRAMING
// =============================================================================

/// Identifier prefix marking a handshake field as a STOWAWAY payload.
pub const IDENTIFIER: &[u8] = b"^Stowaway^";

/// Current payload format version.
pub const PAYLOAD_VERSION: u8 = 1;

/// Base added to the version number to keep the version character printable.
pub const VERSION_CHAR_BASE: u8 = 0x3D;

/// Header length: identifier plus one version character.
pub const HEADER_SIZE: usize = IDENTIFIER.len() + 1;

/// Separator between encoded sections. Outside the URL-safe base64
/// alphabet, so it can never appear inside an encoded section.
pub const SECTION_SEPARATOR: u8 = 0x21; // '!'

/// Separator between fields of the outer handshake string and between
/// fields of the plaintext identity payload.
pub const FIELD_SEPARATOR: char = '\0';

// =============================================================================
// CRYPTOGRAPHIC CONSTANTS
// =============================================================================

/// AES-256-GCM key size.
pub const AES_KEY_SIZE: usize = 32;

/// AES-GCM nonce size. A fresh random nonce is drawn per encode call.
pub const AEAD_NONCE_SIZE: usize = 12;

/// AES-GCM authentication tag size.
pub const AEAD_TAG_SIZE: usize = 16;

/// Ed25519 signature size.
pub const SIGNATURE_SIZE: usize = 64;

/// Ed25519 public/private key half size.
pub const ED25519_KEY_SIZE: usize = 32;

/// Section count produced by every current cipher suite.
pub const SECTION_COUNT: usize = 2;

// =============================================================================
// IDENTITY SCHEMA (v1)
// =============================================================================

/// Field count of the v1 identity payload.
pub const IDENTITY_FIELD_COUNT: usize = 9;

// =============================================================================
// HANDSHAKE TIMING
// =============================================================================

/// Maximum age of a payload timestamp before the handshake is rejected.
pub const TIMESTAMP_WINDOW: Duration = Duration::from_secs(6);

/// Slack added to the timestamp window for minor clock differences.
pub const TIMESTAMP_ERROR_MARGIN: Duration = Duration::from_millis(150);

/// How long a handled handshake is remembered for replay rejection.
pub const REPLAY_CACHE_TTL: Duration = Duration::from_secs(10);

/// Upper bound on remembered handshakes.
pub const REPLAY_CACHE_CAPACITY: usize = 500;

// =============================================================================
// LINKING
// =============================================================================

/// Digits in a generated link code.
pub const LINK_CODE_DIGITS: usize = 4;

/// Default lifetime of a pending link request.
pub const DEFAULT_LINK_TIMEOUT: Duration = Duration::from_secs(300);
