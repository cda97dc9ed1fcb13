use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::services::cache::CacheError;

/// Lookup / write interface for revoked access-token ids (`jti`).
///
/// - `is_revoked`: `Ok(true)` revoked, `Ok(false)` not revoked,
///   `Err(_)` backend failure (callers must treat it as "cannot verify").
/// - `revoke`: once it returns `Ok`, every `is_revoked` against the same
///   shared store reports `true` for that id.
/// - `revoke_until`: same, for a token known to expire at `expires_at`.
///   Stores that expire entries must keep this one at least that long.
#[async_trait]
pub trait RevocationChecker: Send + Sync {
    async fn is_revoked(&self, token_id: &str) -> Result<bool, RevocationError>;

    async fn revoke(&self, token_id: &str) -> Result<(), RevocationError>;

    async fn revoke_until(
        &self,
        token_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), RevocationError> {
        let _ = expires_at;
        self.revoke(token_id).await
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RevocationError {
    #[error(transparent)]
    Cache(#[from] CacheError),
}
