//! Storage seams for link records.
//!
//! Atomicity is delegated to the backing storage: `consume` must be a
//! conditional delete-and-return, so that exactly one of N concurrent
//! calls for the same logical request wins. Any datastore offering that
//! operation (relational, embedded, or remote) can implement these
//! traits; [`MemoryLinkStore`] is the in-process reference.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use uuid::Uuid;

use crate::core::LinkError;

use super::{ConsumeMatch, LinkRequest, LinkedPlayer};

/// Result of a consume attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The unique matching record, deleted in the same step.
    Consumed(LinkRequest),
    /// No record matched. An ordinary user-facing outcome, not an error.
    Missing,
    /// The only matching record was past its timeout; it was removed and
    /// is reported distinctly so the user can be told the code expired.
    Expired,
}

/// Store of pending link requests.
#[allow(async_fn_in_trait)]
pub trait LinkRequestStore: Send + Sync {
    /// Persist a new request. A request re-issued for the same username
    /// pair replaces the previous one.
    async fn create(&self, request: LinkRequest) -> Result<(), LinkError>;

    /// Atomically delete and return the unique record matching the
    /// pattern. Expired records are never consumed.
    async fn consume(
        &self,
        pattern: &ConsumeMatch,
        timeout: Duration,
    ) -> Result<ConsumeOutcome, LinkError>;

    /// Explicit removal, e.g. an operator cancel.
    async fn delete(&self, request: &LinkRequest) -> Result<(), LinkError>;
}

/// Store of completed links.
#[allow(async_fn_in_trait)]
pub trait LinkedPlayerStore: Send + Sync {
    /// Persist a completed link.
    async fn insert(&self, link: LinkedPlayer) -> Result<(), LinkError>;

    /// Look a link up by the platform-native identity.
    async fn fetch(&self, bedrock_unique_id: Uuid) -> Result<Option<LinkedPlayer>, LinkError>;

    /// Remove a link.
    async fn remove(&self, bedrock_unique_id: Uuid) -> Result<(), LinkError>;
}

/// In-process reference store.
///
/// One mutex per record family gives the conditional delete-and-return
/// its at-most-one-winner guarantee.
#[derive(Default)]
pub struct MemoryLinkStore {
    requests: Mutex<Vec<LinkRequest>>,
    links: Mutex<HashMap<Uuid, LinkedPlayer>>,
}

impl MemoryLinkStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn requests(&self) -> Result<std::sync::MutexGuard<'_, Vec<LinkRequest>>, LinkError> {
        self.requests
            .lock()
            .map_err(|_| LinkError::Storage("request store lock poisoned".into()))
    }

    fn links(&self) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, LinkedPlayer>>, LinkError> {
        self.links
            .lock()
            .map_err(|_| LinkError::Storage("link store lock poisoned".into()))
    }
}

impl LinkRequestStore for MemoryLinkStore {
    async fn create(&self, request: LinkRequest) -> Result<(), LinkError> {
        let mut requests = self.requests()?;
        requests.retain(|existing| {
            existing.java_username != request.java_username
                || existing.bedrock_username != request.bedrock_username
        });
        requests.push(request);
        Ok(())
    }

    async fn consume(
        &self,
        pattern: &ConsumeMatch,
        timeout: Duration,
    ) -> Result<ConsumeOutcome, LinkError> {
        let mut requests = self.requests()?;

        if let Some(index) = requests
            .iter()
            .position(|r| r.matches(pattern) && !r.is_expired(timeout))
        {
            return Ok(ConsumeOutcome::Consumed(requests.remove(index)));
        }

        if let Some(index) = requests.iter().position(|r| r.matches(pattern)) {
            // Matched but expired: lazy cleanup, reported distinctly.
            requests.remove(index);
            return Ok(ConsumeOutcome::Expired);
        }

        Ok(ConsumeOutcome::Missing)
    }

    async fn delete(&self, request: &LinkRequest) -> Result<(), LinkError> {
        self.requests()?.retain(|existing| existing != request);
        Ok(())
    }
}

impl LinkedPlayerStore for MemoryLinkStore {
    async fn insert(&self, link: LinkedPlayer) -> Result<(), LinkError> {
        self.links()?.insert(link.bedrock_unique_id, link);
        Ok(())
    }

    async fn fetch(&self, bedrock_unique_id: Uuid) -> Result<Option<LinkedPlayer>, LinkError> {
        Ok(self.links()?.get(&bedrock_unique_id).cloned())
    }

    async fn remove(&self, bedrock_unique_id: Uuid) -> Result<(), LinkError> {
        self.links()?.remove(&bedrock_unique_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::now_epoch_secs;
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(300);

    fn open(code: &str) -> ConsumeMatch {
        ConsumeMatch::Open {
            bedrock_username: "SteveBE".into(),
            link_code: code.into(),
        }
    }

    fn request(code: &str) -> LinkRequest {
        LinkRequest::from_java(Uuid::new_v4(), "SteveJE", "SteveBE", code)
    }

    #[tokio::test]
    async fn test_consume_deletes_and_returns() {
        let store = MemoryLinkStore::new();
        store.create(request("0042")).await.unwrap();

        match store.consume(&open("0042"), TIMEOUT).await.unwrap() {
            ConsumeOutcome::Consumed(consumed) => {
                assert_eq!(consumed.link_code, "0042");
            }
            other => panic!("expected consumption, got {other:?}"),
        }

        // Gone after the first consume.
        assert_eq!(
            store.consume(&open("0042"), TIMEOUT).await.unwrap(),
            ConsumeOutcome::Missing
        );
    }

    #[tokio::test]
    async fn test_wrong_code_is_missing() {
        let store = MemoryLinkStore::new();
        store.create(request("0042")).await.unwrap();

        assert_eq!(
            store.consume(&open("9999"), TIMEOUT).await.unwrap(),
            ConsumeOutcome::Missing
        );
    }

    #[tokio::test]
    async fn test_expiry_boundary() {
        let store = MemoryLinkStore::new();
        let timeout = Duration::from_secs(300);

        // One second inside the window: consumable.
        store
            .create(request("0001").request_time(now_epoch_secs() - 299))
            .await
            .unwrap();
        assert!(matches!(
            store.consume(&open("0001"), timeout).await.unwrap(),
            ConsumeOutcome::Consumed(_)
        ));

        // One second past the window: absent (reported expired), and the
        // record is cleaned up.
        store
            .create(request("0002").request_time(now_epoch_secs() - 301))
            .await
            .unwrap();
        assert_eq!(
            store.consume(&open("0002"), timeout).await.unwrap(),
            ConsumeOutcome::Expired
        );
        assert_eq!(
            store.consume(&open("0002"), timeout).await.unwrap(),
            ConsumeOutcome::Missing
        );
    }

    #[tokio::test]
    async fn test_exactly_once_under_concurrency() {
        let store = Arc::new(MemoryLinkStore::new());
        store.create(request("0042")).await.unwrap();

        let mut tasks = Vec::new();
        for _ in 0..32 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.consume(&open("0042"), TIMEOUT).await.unwrap()
            }));
        }

        let mut wins = 0;
        let mut misses = 0;
        for task in tasks {
            match task.await.unwrap() {
                ConsumeOutcome::Consumed(_) => wins += 1,
                ConsumeOutcome::Missing => misses += 1,
                ConsumeOutcome::Expired => panic!("unexpected expiry"),
            }
        }
        assert_eq!(wins, 1);
        assert_eq!(misses, 31);
    }

    #[tokio::test]
    async fn test_recreate_replaces_previous_request() {
        let store = MemoryLinkStore::new();
        store.create(request("0001")).await.unwrap();
        store.create(request("0002")).await.unwrap();

        assert_eq!(
            store.consume(&open("0001"), TIMEOUT).await.unwrap(),
            ConsumeOutcome::Missing
        );
        assert!(matches!(
            store.consume(&open("0002"), TIMEOUT).await.unwrap(),
            ConsumeOutcome::Consumed(_)
        ));
    }

    #[tokio::test]
    async fn test_explicit_delete() {
        let store = MemoryLinkStore::new();
        let req = request("0042");
        store.create(req.clone()).await.unwrap();
        store.delete(&req).await.unwrap();

        assert_eq!(
            store.consume(&open("0042"), TIMEOUT).await.unwrap(),
            ConsumeOutcome::Missing
        );
    }

    #[tokio::test]
    async fn test_linked_player_store_roundtrip() {
        let store = MemoryLinkStore::new();
        let bedrock_id = Uuid::from_u64_pair(0, 42);
        let link = LinkedPlayer {
            bedrock_unique_id: bedrock_id,
            java_unique_id: Uuid::new_v4(),
            java_username: "SteveJE".into(),
        };

        store.insert(link.clone()).await.unwrap();
        assert_eq!(store.fetch(bedrock_id).await.unwrap(), Some(link));

        store.remove(bedrock_id).await.unwrap();
        assert_eq!(store.fetch(bedrock_id).await.unwrap(), None);
    }
}
