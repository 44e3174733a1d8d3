//! STOWAWAY Protocol - Identity Schema
//!
//! The versioned plaintext payload that travels inside the encrypted
//! sections. Schema v1 is a fixed, ordered list of NUL-joined UTF-8
//! fields:
//!
//! ```text
//! version \0 xuid \0 username \0 device_os \0 language \0
//! ui_profile \0 input_mode \0 ip \0 timestamp
//! ```
//!
//! Any change to the field list or order requires bumping
//! [`PAYLOAD_VERSION`](crate::core::PAYLOAD_VERSION) so the sniffer and
//! the version error stay truthful.

use uuid::Uuid;

use crate::core::{
    CodecError, FIELD_SEPARATOR, IDENTITY_FIELD_COUNT, PAYLOAD_VERSION, now_epoch_secs,
};

/// The decoded secondary identity carried through the handshake.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BedrockIdentity {
    /// Schema version the payload was encoded with.
    pub version: u8,
    /// The platform-native numeric identity.
    pub xuid: u64,
    /// The platform-native username.
    pub username: String,
    /// Device operating system identifier.
    pub device_os: u16,
    /// Locale code, e.g. `en_US`.
    pub language: String,
    /// UI profile identifier.
    pub ui_profile: u8,
    /// Input mode identifier.
    pub input_mode: u8,
    /// Remote address as observed by the encoding proxy.
    pub ip: String,
    /// Encode time, seconds since the Unix epoch. Checked against the
    /// freshness window by the handshake handler.
    pub timestamp: u64,
}

impl BedrockIdentity {
    /// Start a v1 identity with the current time and empty optionals.
    pub fn new(xuid: u64, username: impl Into<String>) -> Self {
        Self {
            version: PAYLOAD_VERSION,
            xuid,
            username: username.into(),
            device_os: 0,
            language: String::new(),
            ui_profile: 0,
            input_mode: 0,
            ip: String::new(),
            timestamp: now_epoch_secs(),
        }
    }

    /// Set the device operating system identifier.
    pub fn device_os(mut self, device_os: u16) -> Self {
        self.device_os = device_os;
        self
    }

    /// Set the locale code.
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the UI profile identifier.
    pub fn ui_profile(mut self, ui_profile: u8) -> Self {
        self.ui_profile = ui_profile;
        self
    }

    /// Set the input mode identifier.
    pub fn input_mode(mut self, input_mode: u8) -> Self {
        self.input_mode = input_mode;
        self
    }

    /// Set the observed remote address.
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Set the encode timestamp (seconds since the Unix epoch).
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// The stable UUID derived from the platform-native identity.
    ///
    /// The upper 64 bits are zero, which can never collide with the
    /// primary realm's random UUIDs.
    pub fn bedrock_uuid(&self) -> Uuid {
        Uuid::from_u64_pair(0, self.xuid)
    }

    /// Serialize to the NUL-joined plaintext.
    pub fn to_payload(&self) -> String {
        [
            self.version.to_string(),
            self.xuid.to_string(),
            self.username.clone(),
            self.device_os.to_string(),
            self.language.clone(),
            self.ui_profile.to_string(),
            self.input_mode.to_string(),
            self.ip.clone(),
            self.timestamp.to_string(),
        ]
        .join(&FIELD_SEPARATOR.to_string())
    }

    /// Parse the NUL-joined plaintext back into an identity.
    ///
    /// A wrong field count or unparseable numeric field is a format
    /// error; a schema version this build does not speak is a version
    /// error carrying both versions.
    pub fn from_payload(payload: &str) -> Result<Self, CodecError> {
        let fields: Vec<&str> = payload.split(FIELD_SEPARATOR).collect();
        if fields.len() != IDENTITY_FIELD_COUNT {
            return Err(CodecError::Format(format!(
                "identity payload must have {IDENTITY_FIELD_COUNT} fields, got {}",
                fields.len()
            )));
        }

        let version: u8 = parse_field(fields[0], "version")?;
        if version != PAYLOAD_VERSION {
            return Err(CodecError::Version {
                expected: PAYLOAD_VERSION,
                received: version,
            });
        }

        Ok(Self {
            version,
            xuid: parse_field(fields[1], "xuid")?,
            username: fields[2].to_string(),
            device_os: parse_field(fields[3], "device_os")?,
            language: fields[4].to_string(),
            ui_profile: parse_field(fields[5], "ui_profile")?,
            input_mode: parse_field(fields[6], "input_mode")?,
            ip: fields[7].to_string(),
            timestamp: parse_field(fields[8], "timestamp")?,
        })
    }
}

fn parse_field<T: std::str::FromStr>(raw: &str, name: &str) -> Result<T, CodecError> {
    raw.parse()
        .map_err(|_| CodecError::Format(format!("unparseable {name} field: {raw:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> BedrockIdentity {
        BedrockIdentity::new(0x0009_01F6_4F30_4AD1, "Steve")
            .device_os(7)
            .language("en_US")
            .ui_profile(1)
            .input_mode(2)
            .ip("192.0.2.7")
            .timestamp(1_700_000_000)
    }

    #[test]
    fn test_payload_roundtrip() {
        let original = identity();
        let decoded = BedrockIdentity::from_payload(&original.to_payload()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_field_count_enforced() {
        let mut payload = identity().to_payload();
        payload.push('\0');
        payload.push_str("extra");

        assert!(matches!(
            BedrockIdentity::from_payload(&payload),
            Err(CodecError::Format(_))
        ));
    }

    #[test]
    fn test_unparseable_xuid_is_format_error() {
        let mut fields: Vec<String> =
            identity().to_payload().split('\0').map(str::to_string).collect();
        fields[1] = "not-a-number".into();
        let payload = fields.join("\0");

        assert!(matches!(
            BedrockIdentity::from_payload(&payload),
            Err(CodecError::Format(_))
        ));
    }

    #[test]
    fn test_schema_version_mismatch() {
        let mut fields: Vec<String> =
            identity().to_payload().split('\0').map(str::to_string).collect();
        fields[0] = (PAYLOAD_VERSION + 3).to_string();
        let payload = fields.join("\0");

        match BedrockIdentity::from_payload(&payload) {
            Err(CodecError::Version { expected, received }) => {
                assert_eq!(expected, PAYLOAD_VERSION);
                assert_eq!(received, PAYLOAD_VERSION + 3);
            }
            other => panic!("expected version error, got {other:?}"),
        }
    }

    #[test]
    fn test_bedrock_uuid_derivation() {
        let id = identity();
        let uuid = id.bedrock_uuid();
        assert_eq!(uuid.as_u64_pair(), (0, id.xuid));
    }
}
