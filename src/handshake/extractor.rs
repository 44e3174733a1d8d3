//! Payload extraction from the handshake string.
//!
//! The host protocol delivers one bounded string that an unrelated
//! convention splits into NUL-delimited fields. At most one field carries
//! an embedded payload; it is located, removed and decoded without
//! disturbing the remaining fields.

use tracing::debug;

use crate::codec::{PayloadCodec, sniffer};
use crate::core::{CodecError, FIELD_SEPARATOR};
use crate::identity::BedrockIdentity;

/// What to do when more than one field classifies as a payload shape.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AmbiguityPolicy {
    /// Select the first matching field; later look-alikes stay in place.
    #[default]
    FirstMatch,
    /// Reject the handshake as malformed.
    Reject,
}

/// The two-part extraction result: the decoded identity (if a payload was
/// embedded) and the handshake string with the payload field removed.
#[derive(Debug, Clone)]
pub struct Extraction {
    /// Decoded identity; `None` when no field carried a payload.
    pub identity: Option<BedrockIdentity>,
    /// The handshake string without the payload field, remaining fields
    /// rejoined in their original relative order.
    pub hostname: String,
}

/// Locates, removes and decodes an embedded payload.
pub struct HandshakeExtractor {
    codec: PayloadCodec,
    policy: AmbiguityPolicy,
}

impl HandshakeExtractor {
    /// Extractor with the default first-match ambiguity policy.
    pub fn new(codec: PayloadCodec) -> Self {
        Self::with_policy(codec, AmbiguityPolicy::default())
    }

    /// Extractor with an explicit ambiguity policy.
    pub fn with_policy(codec: PayloadCodec, policy: AmbiguityPolicy) -> Self {
        Self { codec, policy }
    }

    /// Scan the handshake string for an embedded payload.
    ///
    /// Absence of a payload is a valid outcome, not an error. A payload
    /// that is present but fails to decode is a propagated error: treating
    /// it as absent would let a forged payload masquerade as an ordinary
    /// connection.
    pub fn extract(&self, handshake: &str) -> Result<Extraction, CodecError> {
        let fields: Vec<&str> = handshake.split(FIELD_SEPARATOR).collect();

        let mut candidate: Option<usize> = None;
        for (index, field) in fields.iter().enumerate() {
            if sniffer::classify(field).is_none() {
                continue;
            }
            match (candidate, self.policy) {
                (None, _) => candidate = Some(index),
                (Some(_), AmbiguityPolicy::FirstMatch) => {}
                (Some(first), AmbiguityPolicy::Reject) => {
                    return Err(CodecError::Format(format!(
                        "ambiguous handshake: fields {first} and {index} both \
                         look like payloads"
                    )));
                }
            }
        }

        let Some(index) = candidate else {
            return Ok(Extraction {
                identity: None,
                hostname: handshake.to_string(),
            });
        };

        let mut remaining = fields;
        let token = remaining.remove(index);
        let hostname = remaining.join(&FIELD_SEPARATOR.to_string());

        let plaintext = self.codec.decode_str(token)?;
        let identity = BedrockIdentity::from_payload(&plaintext)?;
        debug!(
            field = index,
            username = %identity.username,
            "extracted embedded identity payload"
        );

        Ok(Extraction {
            identity: Some(identity),
            hostname,
        })
    }
}
