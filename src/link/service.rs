//! Linking service.
//!
//! Orchestrates the stores and the optional remote authority into the
//! user-facing linking flows: create a code from either side, verify a
//! presented code, look a connecting player's link up, unlink.

use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::core::{DEFAULT_LINK_TIMEOUT, LinkError};

use super::{
    ConsumeMatch, ConsumeOutcome, LinkAuthority, LinkRequest, LinkRequestStore, LinkedPlayer,
    LinkedPlayerStore, NoAuthority, generate_link_code, remote,
};

/// User-facing result of presenting a link code.
///
/// `NoSuchCode` and `Expired` are ordinary outcomes shown to the user,
/// not errors; only storage failures are errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LinkOutcome {
    /// The code matched; the durable link was created.
    Linked(LinkedPlayer),
    /// No pending request matched the presented code.
    NoSuchCode,
    /// The matching request was already past its timeout.
    Expired,
}

/// Account-linking front door.
pub struct LinkService<S, A = NoAuthority> {
    store: S,
    authority: Option<A>,
    timeout: Duration,
}

impl<S> LinkService<S, NoAuthority>
where
    S: LinkRequestStore + LinkedPlayerStore,
{
    /// Local-only linking with the default request timeout.
    pub fn new(store: S) -> Self {
        Self {
            store,
            authority: None,
            timeout: DEFAULT_LINK_TIMEOUT,
        }
    }
}

impl<S, A> LinkService<S, A>
where
    S: LinkRequestStore + LinkedPlayerStore,
    A: LinkAuthority,
{
    /// Linking backed by a remote authority in addition to local state.
    pub fn with_authority(store: S, authority: A) -> Self {
        Self {
            store,
            authority: Some(authority),
            timeout: DEFAULT_LINK_TIMEOUT,
        }
    }

    /// Override the pending-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// A Java player starts linking: generates a code the Bedrock player
    /// must present. Store write failures surface to the initiating user.
    pub async fn create_request_from_java(
        &self,
        java_unique_id: Uuid,
        java_username: &str,
        bedrock_username: &str,
    ) -> Result<LinkRequest, LinkError> {
        let request = LinkRequest::from_java(
            java_unique_id,
            java_username,
            bedrock_username,
            generate_link_code(),
        );
        self.store.create(request.clone()).await?;
        debug!(java_username, bedrock_username, "created link request");
        Ok(request)
    }

    /// A Bedrock player starts linking: generates a code the Java player
    /// must present.
    pub async fn create_request_from_bedrock(
        &self,
        bedrock_unique_id: Uuid,
        bedrock_username: &str,
        java_username: &str,
    ) -> Result<LinkRequest, LinkError> {
        let request = LinkRequest::from_bedrock(
            bedrock_unique_id,
            bedrock_username,
            java_username,
            generate_link_code(),
        );
        self.store.create(request.clone()).await?;
        debug!(java_username, bedrock_username, "created link request");
        Ok(request)
    }

    /// A Bedrock player presents a code. Pins their own identity when the
    /// Java username is supplied, otherwise consumes fully open.
    pub async fn complete_for_bedrock(
        &self,
        bedrock_unique_id: Uuid,
        bedrock_username: &str,
        java_username: Option<&str>,
        link_code: &str,
    ) -> Result<LinkOutcome, LinkError> {
        let pattern = match java_username {
            Some(java_username) => ConsumeMatch::BedrockPinned {
                bedrock_unique_id,
                java_username: java_username.into(),
                bedrock_username: bedrock_username.into(),
                link_code: link_code.into(),
            },
            None => ConsumeMatch::Open {
                bedrock_username: bedrock_username.into(),
                link_code: link_code.into(),
            },
        };
        self.complete(pattern, None, Some(bedrock_unique_id)).await
    }

    /// A Java player presents a code for a Bedrock-initiated request.
    pub async fn complete_for_java(
        &self,
        java_unique_id: Uuid,
        java_username: &str,
        bedrock_username: &str,
        link_code: &str,
    ) -> Result<LinkOutcome, LinkError> {
        let pattern = ConsumeMatch::JavaPinned {
            java_unique_id,
            java_username: java_username.into(),
            bedrock_username: bedrock_username.into(),
            link_code: link_code.into(),
        };
        self.complete(pattern, Some(java_unique_id), None).await
    }

    async fn complete(
        &self,
        pattern: ConsumeMatch,
        completer_java_id: Option<Uuid>,
        completer_bedrock_id: Option<Uuid>,
    ) -> Result<LinkOutcome, LinkError> {
        let request = match self.store.consume(&pattern, self.timeout).await? {
            ConsumeOutcome::Consumed(request) => request,
            ConsumeOutcome::Missing => return Ok(LinkOutcome::NoSuchCode),
            ConsumeOutcome::Expired => return Ok(LinkOutcome::Expired),
        };

        // The record carries the initiator's identity; the completer's
        // own identity fills the open side.
        let java_unique_id = request.java_unique_id.or(completer_java_id);
        let bedrock_unique_id = request.bedrock_unique_id.or(completer_bedrock_id);
        let (Some(java_unique_id), Some(bedrock_unique_id)) = (java_unique_id, bedrock_unique_id)
        else {
            warn!(
                code = %request.link_code,
                "consumed request cannot be completed: one side's identity is unknown"
            );
            return Ok(LinkOutcome::NoSuchCode);
        };

        let link = LinkedPlayer {
            bedrock_unique_id,
            java_unique_id,
            java_username: request.java_username,
        };
        self.store.insert(link.clone()).await?;
        Ok(LinkOutcome::Linked(link))
    }

    /// Look up the link for a connecting player.
    ///
    /// Local state first; when unknown locally and a remote authority is
    /// configured, it is consulted and its answer cached locally. A
    /// failing authority degrades to "unlinked".
    pub async fn fetch_link(
        &self,
        bedrock_unique_id: Uuid,
    ) -> Result<Option<LinkedPlayer>, LinkError> {
        if let Some(link) = self.store.fetch(bedrock_unique_id).await? {
            return Ok(Some(link));
        }

        let Some(authority) = &self.authority else {
            return Ok(None);
        };
        let Some(link) = remote::fetch_degraded(authority, bedrock_unique_id).await else {
            return Ok(None);
        };

        // Cache failures must not hide a known link.
        if let Err(error) = self.store.insert(link.clone()).await {
            warn!(%error, "failed to cache remotely fetched link");
        }
        Ok(Some(link))
    }

    /// Remove a durable link.
    pub async fn unlink(&self, bedrock_unique_id: Uuid) -> Result<(), LinkError> {
        self.store.remove(bedrock_unique_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::link::MemoryLinkStore;

    fn bedrock_id() -> Uuid {
        Uuid::from_u64_pair(0, 0x0009_01F6_4F30_4AD1)
    }

    #[tokio::test]
    async fn test_java_initiated_roundtrip() {
        let service = LinkService::new(MemoryLinkStore::new());
        let java_id = Uuid::new_v4();

        let request = service
            .create_request_from_java(java_id, "SteveJE", "SteveBE")
            .await
            .unwrap();

        let outcome = service
            .complete_for_bedrock(bedrock_id(), "SteveBE", None, &request.link_code)
            .await
            .unwrap();

        match outcome {
            LinkOutcome::Linked(link) => {
                assert_eq!(link.java_unique_id, java_id);
                assert_eq!(link.bedrock_unique_id, bedrock_id());
                assert_eq!(link.java_username, "SteveJE");
            }
            other => panic!("expected link, got {other:?}"),
        }

        // Durable and fetchable afterwards.
        let fetched = service.fetch_link(bedrock_id()).await.unwrap();
        assert!(fetched.is_some());

        // The request was consumed exactly once.
        let again = service
            .complete_for_bedrock(bedrock_id(), "SteveBE", None, &request.link_code)
            .await
            .unwrap();
        assert_eq!(again, LinkOutcome::NoSuchCode);
    }

    #[tokio::test]
    async fn test_bedrock_initiated_roundtrip() {
        let service = LinkService::new(MemoryLinkStore::new());
        let java_id = Uuid::new_v4();

        let request = service
            .create_request_from_bedrock(bedrock_id(), "SteveBE", "SteveJE")
            .await
            .unwrap();

        let outcome = service
            .complete_for_java(java_id, "SteveJE", "SteveBE", &request.link_code)
            .await
            .unwrap();

        assert!(matches!(outcome, LinkOutcome::Linked(_)));
    }

    #[tokio::test]
    async fn test_wrong_code_is_no_such_code() {
        let service = LinkService::new(MemoryLinkStore::new());
        service
            .create_request_from_java(Uuid::new_v4(), "SteveJE", "SteveBE")
            .await
            .unwrap();

        let outcome = service
            .complete_for_bedrock(bedrock_id(), "SteveBE", None, "wrong")
            .await
            .unwrap();
        assert_eq!(outcome, LinkOutcome::NoSuchCode);
    }

    #[tokio::test]
    async fn test_expired_code_is_reported() {
        let store = MemoryLinkStore::new();
        let stale = LinkRequest::from_java(Uuid::new_v4(), "SteveJE", "SteveBE", "0042")
            .request_time(crate::core::now_epoch_secs() - 10_000);
        store.create(stale).await.unwrap();

        let service = LinkService::new(store);
        let outcome = service
            .complete_for_bedrock(bedrock_id(), "SteveBE", None, "0042")
            .await
            .unwrap();
        assert_eq!(outcome, LinkOutcome::Expired);
    }

    #[tokio::test]
    async fn test_unlink_removes_durable_link() {
        let service = LinkService::new(MemoryLinkStore::new());
        let request = service
            .create_request_from_java(Uuid::new_v4(), "SteveJE", "SteveBE")
            .await
            .unwrap();
        service
            .complete_for_bedrock(bedrock_id(), "SteveBE", None, &request.link_code)
            .await
            .unwrap();

        service.unlink(bedrock_id()).await.unwrap();
        assert!(service.fetch_link(bedrock_id()).await.unwrap().is_none());
    }

    struct FixedAuthority(LinkedPlayer);

    impl LinkAuthority for FixedAuthority {
        async fn fetch_link(
            &self,
            bedrock_unique_id: Uuid,
        ) -> Result<Option<LinkedPlayer>, LinkError> {
            if bedrock_unique_id == self.0.bedrock_unique_id {
                Ok(Some(self.0.clone()))
            } else {
                Ok(None)
            }
        }
    }

    struct UnreachableAuthority;

    impl LinkAuthority for UnreachableAuthority {
        async fn fetch_link(
            &self,
            _bedrock_unique_id: Uuid,
        ) -> Result<Option<LinkedPlayer>, LinkError> {
            Err(LinkError::Storage("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_remote_authority_populates_local_state() {
        let known = LinkedPlayer {
            bedrock_unique_id: bedrock_id(),
            java_unique_id: Uuid::new_v4(),
            java_username: "SteveJE".into(),
        };
        let service =
            LinkService::with_authority(MemoryLinkStore::new(), FixedAuthority(known.clone()));

        assert_eq!(service.fetch_link(bedrock_id()).await.unwrap(), Some(known));
        // Unknown identities stay unlinked.
        assert!(
            service
                .fetch_link(Uuid::from_u64_pair(0, 7))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_unreachable_authority_degrades_to_unlinked() {
        let service = LinkService::with_authority(MemoryLinkStore::new(), UnreachableAuthority);
        assert!(service.fetch_link(bedrock_id()).await.unwrap().is_none());
    }
}
