//! Header-framed payload codec.
//!
//! Composes a [`CipherSuite`] with the [`joiner`](super::joiner): encode
//! produces `header ‖ joined-sections`, decode validates the header and
//! reverses both steps. The header is the identifier prefix plus one
//! printable version character.

use crate::core::{
    CodecError, HEADER_SIZE, IDENTIFIER, PAYLOAD_VERSION, VERSION_CHAR_BASE,
};
use crate::crypto::CipherSuite;

use super::{joiner, sniffer};

/// Encodes identity payloads into handshake-safe strings and back.
///
/// Stateless beyond the bound suite; safe for unbounded concurrent use
/// across independent connections.
pub struct PayloadCodec {
    suite: CipherSuite,
}

impl PayloadCodec {
    /// Wrap a bound cipher suite.
    pub fn new(suite: CipherSuite) -> Self {
        Self { suite }
    }

    /// The header prepended to every encoded payload.
    pub fn header() -> String {
        let mut header = String::from_utf8_lossy(IDENTIFIER).into_owned();
        header.push((VERSION_CHAR_BASE + PAYLOAD_VERSION) as char);
        header
    }

    /// Encode a plaintext into one opaque handshake-safe string.
    pub fn encode(&self, plaintext: &[u8]) -> Result<String, CodecError> {
        let sections = self.suite.encode(plaintext)?;
        let mut out = Self::header();
        out.push_str(&joiner::encode(&sections));
        Ok(out)
    }

    /// [`encode`](Self::encode) for UTF-8 plaintext.
    pub fn encode_str(&self, plaintext: &str) -> Result<String, CodecError> {
        self.encode(plaintext.as_bytes())
    }

    /// Decode a token produced by [`encode`](Self::encode).
    ///
    /// Fails with a format error when the header is missing or mangled,
    /// a version error when the payload claims a version this build does
    /// not speak, and an authentication error when the suite rejects the
    /// sections. None of these may be treated as "payload absent".
    pub fn decode(&self, token: &str) -> Result<Vec<u8>, CodecError> {
        let version = match sniffer::classify(token) {
            Some(version) => version,
            None => {
                return Err(CodecError::Format(format!(
                    "token of length {} does not carry a payload header",
                    token.len()
                )));
            }
        };
        if version != PAYLOAD_VERSION {
            return Err(CodecError::Version {
                expected: PAYLOAD_VERSION,
                received: version,
            });
        }

        let sections = joiner::decode(&token[HEADER_SIZE..])?;
        if sections.is_empty() {
            return Err(CodecError::Format("payload carries no sections".into()));
        }
        self.suite.decode(&sections)
    }

    /// [`decode`](Self::decode) into UTF-8 plaintext.
    pub fn decode_str(&self, token: &str) -> Result<String, CodecError> {
        String::from_utf8(self.decode(token)?)
            .map_err(|_| CodecError::Format("plaintext is not valid UTF-8".into()))
    }
}
