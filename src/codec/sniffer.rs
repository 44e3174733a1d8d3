//! Version sniffing.
//!
//! A cheap, non-cryptographic structural check used to decide whether a
//! handshake field is worth attempting to decode at all, and which payload
//! format version it claims to be. Never authoritative: only a successful
//! [`PayloadCodec::decode`](super::PayloadCodec::decode) confirms validity.

use crate::core::{HEADER_SIZE, IDENTIFIER, SECTION_SEPARATOR, VERSION_CHAR_BASE};

/// Highest version number the one-character encoding can express.
const MAX_VERSION: u8 = 0x7E - VERSION_CHAR_BASE;

/// Classify a token as "payload shape, claiming version V" or "not a
/// payload".
///
/// Checks the identifier prefix, the version character and that the
/// remainder stays within the joined-section alphabet. Returns the
/// *claimed* version; an unsupported version is still classified so the
/// decoder can reject it explicitly instead of treating the field as
/// ordinary handshake text.
pub fn classify(token: &str) -> Option<u8> {
    let bytes = token.as_bytes();
    if bytes.len() < HEADER_SIZE {
        return None;
    }
    if &bytes[..IDENTIFIER.len()] != IDENTIFIER {
        return None;
    }

    let version_char = bytes[IDENTIFIER.len()];
    let version = version_char.checked_sub(VERSION_CHAR_BASE)?;
    if version > MAX_VERSION {
        return None;
    }

    if !bytes[HEADER_SIZE..].iter().all(|&b| in_alphabet(b)) {
        return None;
    }

    Some(version)
}

/// URL-safe base64 alphabet plus the section separator.
fn in_alphabet(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_' || b == SECTION_SEPARATOR
}
