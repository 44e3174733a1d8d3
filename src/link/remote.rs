//! Remote link authority.
//!
//! An optional network service that knows links this deployment does
//! not. Consulted to populate or override local link state; any failure,
//! including unreachability, degrades to "unknown/unlinked" and is never
//! fatal.

use tracing::warn;
use uuid::Uuid;

use crate::core::LinkError;

use super::LinkedPlayer;

/// A remote service answering "which primary-realm identity is linked to
/// this platform-native identity?".
#[allow(async_fn_in_trait)]
pub trait LinkAuthority: Send + Sync {
    /// Fetch the link for a platform-native identity, if any.
    async fn fetch_link(&self, bedrock_unique_id: Uuid) -> Result<Option<LinkedPlayer>, LinkError>;
}

/// Authority placeholder for deployments that only link locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthority;

impl LinkAuthority for NoAuthority {
    async fn fetch_link(
        &self,
        _bedrock_unique_id: Uuid,
    ) -> Result<Option<LinkedPlayer>, LinkError> {
        Ok(None)
    }
}

/// Consult an authority, degrading every failure to "unlinked".
pub(super) async fn fetch_degraded<A: LinkAuthority>(
    authority: &A,
    bedrock_unique_id: Uuid,
) -> Option<LinkedPlayer> {
    match authority.fetch_link(bedrock_unique_id).await {
        Ok(link) => link,
        Err(error) => {
            warn!(%bedrock_unique_id, %error, "link authority unavailable, treating as unlinked");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Unreachable;

    impl LinkAuthority for Unreachable {
        async fn fetch_link(
            &self,
            _bedrock_unique_id: Uuid,
        ) -> Result<Option<LinkedPlayer>, LinkError> {
            Err(LinkError::Storage("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_failures_degrade_to_unlinked() {
        let result = fetch_degraded(&Unreachable, Uuid::from_u64_pair(0, 42)).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_no_authority_is_always_unlinked() {
        let result = fetch_degraded(&NoAuthority, Uuid::from_u64_pair(0, 42)).await;
        assert!(result.is_none());
    }
}
