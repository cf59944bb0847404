//! In-process revocation store for tests and local development.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::error::AuthError;
use crate::revocation::{dedupe, RevocationRecord, RevocationStore};

/// HashMap-backed store with the same contract as the Redis one.
#[derive(Debug, Default)]
pub struct InMemoryRevocationStore {
    records: RwLock<HashMap<String, RevocationRecord>>,
}

impl InMemoryRevocationStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live records, for assertions in tests.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn revoke(&self, records: &[RevocationRecord]) -> Result<(), AuthError> {
        let unique = dedupe(records);
        if unique.is_empty() {
            return Ok(());
        }

        let mut map = self.records.write().await;

        // Opportunistic pruning: records for naturally-expired tokens are
        // no longer load-bearing, the expiry check rejects those tokens.
        let now = Utc::now();
        map.retain(|_, record| record.expires_at > now);

        let mut inserted = 0;
        for record in unique {
            if !map.contains_key(&record.jti) {
                map.insert(record.jti.clone(), record.clone());
                inserted += 1;
            }
        }

        crate::metrics::record_revocations("memory", inserted);
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        Ok(self.records.read().await.contains_key(jti))
    }
}
