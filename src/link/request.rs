//! Link records and consume patterns.

use std::time::Duration;

use rand::Rng;
use rand::rngs::OsRng;
use uuid::Uuid;

use crate::core::{LINK_CODE_DIGITS, now_epoch_secs};

/// A pending account-link request.
///
/// Created when a player initiates linking from either side; the
/// initiating side's native identity is recorded, the other side's is
/// filled in when the code is verified. At most one side is unset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkRequest {
    /// Primary-realm identity, when known at creation.
    pub java_unique_id: Option<Uuid>,
    /// Primary-realm username.
    pub java_username: String,
    /// Platform-native identity, when known at creation.
    pub bedrock_unique_id: Option<Uuid>,
    /// Platform-native username.
    pub bedrock_username: String,
    /// The short code the other side must present.
    pub link_code: String,
    /// Creation time, seconds since the Unix epoch.
    pub request_time: u64,
}

impl LinkRequest {
    /// Request initiated by the primary-realm (Java) player.
    pub fn from_java(
        java_unique_id: Uuid,
        java_username: impl Into<String>,
        bedrock_username: impl Into<String>,
        link_code: impl Into<String>,
    ) -> Self {
        Self {
            java_unique_id: Some(java_unique_id),
            java_username: java_username.into(),
            bedrock_unique_id: None,
            bedrock_username: bedrock_username.into(),
            link_code: link_code.into(),
            request_time: now_epoch_secs(),
        }
    }

    /// Request initiated by the platform-native (Bedrock) player.
    pub fn from_bedrock(
        bedrock_unique_id: Uuid,
        bedrock_username: impl Into<String>,
        java_username: impl Into<String>,
        link_code: impl Into<String>,
    ) -> Self {
        Self {
            java_unique_id: None,
            java_username: java_username.into(),
            bedrock_unique_id: Some(bedrock_unique_id),
            bedrock_username: bedrock_username.into(),
            link_code: link_code.into(),
            request_time: now_epoch_secs(),
        }
    }

    /// Override the creation time (storage backends restoring rows).
    pub fn request_time(mut self, request_time: u64) -> Self {
        self.request_time = request_time;
        self
    }

    /// Whether this request is past its timeout.
    ///
    /// Expired requests are invisible to every match operation even
    /// before physical cleanup.
    pub fn is_expired(&self, timeout: Duration) -> bool {
        now_epoch_secs().saturating_sub(self.request_time) > timeout.as_secs()
    }

    /// Whether this request matches a consume pattern.
    ///
    /// The link code and bedrock username always participate. A pinned
    /// identity is compared when the record carries that side's identity;
    /// patterns that pin the side the record left open only contribute
    /// username equality, so the pinned identity can complete the link.
    pub fn matches(&self, pattern: &ConsumeMatch) -> bool {
        match pattern {
            ConsumeMatch::JavaPinned {
                java_unique_id,
                java_username,
                bedrock_username,
                link_code,
            } => {
                self.link_code == *link_code
                    && self.bedrock_username == *bedrock_username
                    && self.java_username == *java_username
                    && self
                        .java_unique_id
                        .is_none_or(|id| id == *java_unique_id)
            }
            ConsumeMatch::BedrockPinned {
                bedrock_unique_id,
                java_username,
                bedrock_username,
                link_code,
            } => {
                self.link_code == *link_code
                    && self.bedrock_username == *bedrock_username
                    && self.java_username == *java_username
                    && self
                        .bedrock_unique_id
                        .is_none_or(|id| id == *bedrock_unique_id)
            }
            ConsumeMatch::Open {
                bedrock_username,
                link_code,
            } => self.link_code == *link_code && self.bedrock_username == *bedrock_username,
        }
    }
}

/// The durable result of a completed link.
///
/// Created once per successful match; looked up on every subsequent
/// connection by the platform-native identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkedPlayer {
    /// Platform-native identity.
    pub bedrock_unique_id: Uuid,
    /// Primary-realm identity.
    pub java_unique_id: Uuid,
    /// Primary-realm username.
    pub java_username: String,
}

/// The three supported consume patterns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeMatch {
    /// Primary-realm identity pinned, both usernames and the code.
    JavaPinned {
        /// The completing Java player's identity.
        java_unique_id: Uuid,
        /// Primary-realm username.
        java_username: String,
        /// Platform-native username.
        bedrock_username: String,
        /// The presented code.
        link_code: String,
    },
    /// Platform-native identity pinned, both usernames and the code.
    BedrockPinned {
        /// The completing Bedrock player's identity.
        bedrock_unique_id: Uuid,
        /// Primary-realm username.
        java_username: String,
        /// Platform-native username.
        bedrock_username: String,
        /// The presented code.
        link_code: String,
    },
    /// Fully open: platform-native username and the code only.
    Open {
        /// Platform-native username.
        bedrock_username: String,
        /// The presented code.
        link_code: String,
    },
}

/// Generate a fresh numeric link code.
pub fn generate_link_code() -> String {
    let bound = 10u32.pow(LINK_CODE_DIGITS as u32);
    format!(
        "{:0width$}",
        OsRng.gen_range(0..bound),
        width = LINK_CODE_DIGITS
    )
}
