//! STOWAWAY Protocol - Handshake Layer
//!
//! Composes the codec layers into the server-side handshake pipeline:
//!
//! - [`HandshakeExtractor`]: find, remove and decode the embedded payload
//! - [`IdentityRegistry`]: the integrated variant, fed by a side-channel
//!   keyed by connection instead of re-scanning text
//! - [`HandshakeHandler`]: extraction plus freshness and replay checks
//!
//! The pipeline may be slow (crypto, storage, a remote round-trip) and is
//! meant to run off the connection's hot path behind a
//! [`PacketGate`](crate::gate::PacketGate); the host forwards the cleaned
//! hostname to the surrounding protocol once the handler returns.

mod extractor;

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use crate::core::{
    REPLAY_CACHE_CAPACITY, REPLAY_CACHE_TTL, StowawayError, TIMESTAMP_ERROR_MARGIN,
    TIMESTAMP_WINDOW, now_epoch_secs,
};
use crate::identity::BedrockIdentity;

pub use extractor::*;

/// Tunables for the handshake handler.
#[derive(Debug, Clone)]
pub struct HandshakeConfig {
    /// Policy for multiple payload-shaped fields.
    pub ambiguity: AmbiguityPolicy,
    /// Maximum accepted payload age.
    pub timestamp_window: Duration,
    /// Slack for minor clock differences, applied in both directions.
    pub error_margin: Duration,
    /// Disable the freshness and replay checks (for hosts that have no
    /// synchronized clock with the encoding proxy).
    pub check_freshness: bool,
}

impl Default for HandshakeConfig {
    fn default() -> Self {
        Self {
            ambiguity: AmbiguityPolicy::default(),
            timestamp_window: TIMESTAMP_WINDOW,
            error_margin: TIMESTAMP_ERROR_MARGIN,
            check_freshness: true,
        }
    }
}

/// Outcome of a handled handshake.
#[derive(Debug, Clone)]
pub enum HandshakeOutcome {
    /// No field carried a payload; an ordinary connection.
    NoPayload {
        /// The unchanged handshake string.
        hostname: String,
    },
    /// A payload was present, decoded and accepted.
    Identified {
        /// The decoded identity.
        identity: BedrockIdentity,
        /// The handshake string with the payload field removed.
        hostname: String,
    },
}

/// Remembers recently handled handshakes to reject replays.
///
/// A replayed payload carries a timestamp no newer than the one already
/// seen for the same identity.
struct ReplayCache {
    seen: HashMap<u64, (u64, Instant)>,
}

impl ReplayCache {
    fn new() -> Self {
        Self {
            seen: HashMap::new(),
        }
    }

    /// Record `(xuid, timestamp)`; returns false when it replays an entry.
    fn record(&mut self, xuid: u64, timestamp: u64) -> bool {
        self.seen
            .retain(|_, (_, inserted)| inserted.elapsed() < REPLAY_CACHE_TTL);

        if let Some((seen_ts, _)) = self.seen.get(&xuid) {
            if timestamp <= *seen_ts {
                return false;
            }
        }

        if self.seen.len() >= REPLAY_CACHE_CAPACITY && !self.seen.contains_key(&xuid) {
            // Evict the oldest entry to stay bounded.
            if let Some(oldest) = self
                .seen
                .iter()
                .min_by_key(|(_, (_, inserted))| *inserted)
                .map(|(k, _)| *k)
            {
                self.seen.remove(&oldest);
            }
        }

        self.seen.insert(xuid, (timestamp, Instant::now()));
        true
    }
}

/// The full server-side handshake step: extract, then vet.
pub struct HandshakeHandler {
    extractor: HandshakeExtractor,
    config: HandshakeConfig,
    replays: Mutex<ReplayCache>,
}

impl HandshakeHandler {
    /// Handler with default configuration.
    pub fn new(codec: crate::codec::PayloadCodec) -> Self {
        Self::with_config(codec, HandshakeConfig::default())
    }

    /// Handler with explicit configuration.
    pub fn with_config(codec: crate::codec::PayloadCodec, config: HandshakeConfig) -> Self {
        Self {
            extractor: HandshakeExtractor::with_policy(codec, config.ambiguity),
            config,
            replays: Mutex::new(ReplayCache::new()),
        }
    }

    /// Handle one handshake string.
    ///
    /// Every error is a reason to reject the connection; only
    /// [`HandshakeOutcome::NoPayload`] continues as an ordinary
    /// connection.
    pub fn handle(&self, handshake: &str) -> Result<HandshakeOutcome, StowawayError> {
        let extraction = self.extractor.extract(handshake)?;

        let Some(identity) = extraction.identity else {
            return Ok(HandshakeOutcome::NoPayload {
                hostname: extraction.hostname,
            });
        };

        if self.config.check_freshness {
            self.check_freshness(&identity)?;

            let replay_ok = self
                .replays
                .lock()
                .map(|mut cache| cache.record(identity.xuid, identity.timestamp))
                .unwrap_or(false);
            if !replay_ok {
                return Err(StowawayError::ReplayedHandshake);
            }
        }

        Ok(HandshakeOutcome::Identified {
            identity,
            hostname: extraction.hostname,
        })
    }

    fn check_freshness(&self, identity: &BedrockIdentity) -> Result<(), StowawayError> {
        let now_ms = now_epoch_secs() as u128 * 1000;
        let payload_ms = identity.timestamp as u128 * 1000;
        let window_ms = self.config.timestamp_window.as_millis();
        let margin_ms = self.config.error_margin.as_millis();

        let too_old = now_ms > payload_ms + window_ms + margin_ms;
        let from_future = payload_ms > now_ms + margin_ms;
        if too_old || from_future {
            return Err(StowawayError::StaleHandshake);
        }
        Ok(())
    }
}

/// The integrated extraction variant.
///
/// When the encoding proxy runs in-process, the identity is handed over
/// through a side-channel keyed by the connection instead of being
/// re-scanned out of text. The result exposes the identical two-part
/// contract as [`HandshakeExtractor::extract`].
pub struct IdentityRegistry<C: Eq + Hash> {
    pending: Mutex<HashMap<C, BedrockIdentity>>,
}

impl<C: Eq + Hash> IdentityRegistry<C> {
    /// Empty registry.
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    /// Associate an identity with a connection ahead of its handshake.
    pub fn associate(&self, connection: C, identity: BedrockIdentity) {
        if let Ok(mut pending) = self.pending.lock() {
            pending.insert(connection, identity);
        }
    }

    /// Consume the identity associated with the connection, if any.
    ///
    /// The handshake string is never rewritten in integrated mode.
    pub fn take(&self, connection: &C, handshake: &str) -> Extraction {
        let identity = self
            .pending
            .lock()
            .ok()
            .and_then(|mut pending| pending.remove(connection));
        Extraction {
            identity,
            hostname: handshake.to_string(),
        }
    }
}

impl<C: Eq + Hash> Default for IdentityRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::PayloadCodec;
    use crate::crypto::{Algorithm, CipherKey, CipherSuite};

    fn key() -> CipherKey {
        CipherKey::generate(Algorithm::Aes256).unwrap()
    }

    fn codec(key: &CipherKey) -> PayloadCodec {
        PayloadCodec::new(CipherSuite::new(key).unwrap())
    }

    fn encode(key: &CipherKey, identity: &BedrockIdentity) -> String {
        codec(key).encode_str(&identity.to_payload()).unwrap()
    }

    #[test]
    fn test_no_payload_outcome() {
        let handler = HandshakeHandler::new(codec(&key()));
        match handler.handle("play.example.net\0127.0.0.1").unwrap() {
            HandshakeOutcome::NoPayload { hostname } => {
                assert_eq!(hostname, "play.example.net\0127.0.0.1");
            }
            other => panic!("expected NoPayload, got {other:?}"),
        }
    }

    #[test]
    fn test_identified_outcome() {
        let key = key();
        let identity = BedrockIdentity::new(42, "Steve");
        let handshake = format!("host\0{}\0rest", encode(&key, &identity));

        let handler = HandshakeHandler::new(codec(&key));
        match handler.handle(&handshake).unwrap() {
            HandshakeOutcome::Identified { identity, hostname } => {
                assert_eq!(identity.username, "Steve");
                assert_eq!(hostname, "host\0rest");
            }
            other => panic!("expected Identified, got {other:?}"),
        }
    }

    #[test]
    fn test_stale_timestamp_rejected() {
        let key = key();
        let identity = BedrockIdentity::new(42, "Steve")
            .timestamp(now_epoch_secs() - 3600);
        let handshake = encode(&key, &identity);

        let handler = HandshakeHandler::new(codec(&key));
        assert!(matches!(
            handler.handle(&handshake),
            Err(StowawayError::StaleHandshake)
        ));
    }

    #[test]
    fn test_future_timestamp_rejected() {
        let key = key();
        let identity = BedrockIdentity::new(42, "Steve")
            .timestamp(now_epoch_secs() + 3600);
        let handshake = encode(&key, &identity);

        let handler = HandshakeHandler::new(codec(&key));
        assert!(matches!(
            handler.handle(&handshake),
            Err(StowawayError::StaleHandshake)
        ));
    }

    #[test]
    fn test_replayed_handshake_rejected() {
        let key = key();
        let handshake = encode(&key, &BedrockIdentity::new(42, "Steve"));

        let handler = HandshakeHandler::new(codec(&key));
        assert!(handler.handle(&handshake).is_ok());
        assert!(matches!(
            handler.handle(&handshake),
            Err(StowawayError::ReplayedHandshake)
        ));
    }

    #[test]
    fn test_freshness_checks_can_be_disabled() {
        let key = key();
        let identity = BedrockIdentity::new(42, "Steve")
            .timestamp(now_epoch_secs() - 3600);
        let handshake = encode(&key, &identity);

        let config = HandshakeConfig {
            check_freshness: false,
            ..HandshakeConfig::default()
        };
        let handler = HandshakeHandler::with_config(codec(&key), config);
        assert!(handler.handle(&handshake).is_ok());
    }

    #[test]
    fn test_integrated_registry_contract() {
        let registry: IdentityRegistry<u64> = IdentityRegistry::new();
        registry.associate(7, BedrockIdentity::new(42, "Steve"));

        let first = registry.take(&7, "play.example.net");
        assert_eq!(first.identity.unwrap().username, "Steve");
        assert_eq!(first.hostname, "play.example.net");

        // Consumed exactly once.
        let second = registry.take(&7, "play.example.net");
        assert!(second.identity.is_none());
        assert_eq!(second.hostname, "play.example.net");
    }
}
