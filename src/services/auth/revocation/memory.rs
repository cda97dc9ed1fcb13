use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::services::auth::revocation::store::{RevocationChecker, RevocationError};

/// Process-local revocation set.
///
/// Entries never expire and are not shared between instances; fine for
/// tests and single-node development, not for a fleet.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    revoked: RwLock<HashSet<String>>,
}

impl InMemoryRevocationStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RevocationChecker for InMemoryRevocationStore {
    async fn is_revoked(&self, token_id: &str) -> Result<bool, RevocationError> {
        Ok(self.revoked.read().await.contains(token_id))
    }

    async fn revoke(&self, token_id: &str) -> Result<(), RevocationError> {
        self.revoked.write().await.insert(token_id.to_owned());
        Ok(())
    }
}
