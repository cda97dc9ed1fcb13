use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::services::{
    auth::{
        revocation::store::{RevocationChecker, RevocationError},
        temporal::{Clock, SystemClock},
    },
    cache::{CacheClient, ValkeyClient},
};

pub const DEFAULT_PREFIX: &str = "oauth:revoked";

/// Valkey-backed revocation store (Redis protocol)
///
/// One key per revoked id, `<prefix>:<jti>`, expiring once the token would
/// have expired anyway. Backend errors are returned as `Err`; the validator
/// turns them into a rejection (fail-closed).
#[derive(Clone)]
pub struct ValkeyRevocationStore<C: CacheClient> {
    cache: Arc<C>,
    // Key prefix to avoid collisions across environments
    prefix: String,
    // TTL used when the token's `exp` is unknown
    ttl: Duration,
    clock: Arc<dyn Clock>,
}

impl ValkeyRevocationStore<ValkeyClient> {
    pub async fn connect(
        redis_url: &str,
        prefix: impl Into<String>,
        ttl: Duration,
    ) -> Result<Self, RevocationError> {
        let client = ValkeyClient::new(redis_url).await?;
        Ok(Self::new_with_cache(Arc::new(client), prefix, ttl))
    }
}

impl<C: CacheClient> ValkeyRevocationStore<C> {
    pub fn new_with_cache(cache: Arc<C>, prefix: impl Into<String>, ttl: Duration) -> Self {
        Self {
            cache,
            prefix: prefix.into(),
            ttl,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn key(&self, token_id: &str) -> String {
        format!("{}:{}", self.prefix, token_id)
    }

    /// Revoke with an explicit TTL, e.g. the time left until the token's `exp`.
    pub async fn revoke_for(&self, token_id: &str, ttl: Duration) -> Result<(), RevocationError> {
        self.cache
            .set_with_ttl(&self.key(token_id), "1", ttl)
            .await?;

        tracing::info!(
            backend = self.cache.backend_name(),
            jti = %token_id,
            ttl_secs = ttl.as_secs(),
            "access token revoked"
        );
        Ok(())
    }
}

#[async_trait]
impl<C: CacheClient> RevocationChecker for ValkeyRevocationStore<C> {
    async fn is_revoked(&self, token_id: &str) -> Result<bool, RevocationError> {
        Ok(self.cache.exists(&self.key(token_id)).await?)
    }

    async fn revoke(&self, token_id: &str) -> Result<(), RevocationError> {
        self.revoke_for(token_id, self.ttl).await
    }

    async fn revoke_until(
        &self,
        token_id: &str,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<(), RevocationError> {
        let Some(expires_at) = expires_at else {
            return self.revoke(token_id).await;
        };
        self.revoke_for(token_id, remaining(expires_at, self.clock.now()))
            .await
    }
}

// Rounded up past `exp` so the key never disappears while the token is still valid.
fn remaining(expires_at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    let secs = (expires_at - now).num_seconds().max(0);
    Duration::from_secs(secs as u64 + 1)
}
