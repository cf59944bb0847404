//! Redis-backed revocation store.
//!
//! One `revoked:{jti}` key per record, expiring at the token's own expiry.
//! All services point at the same Redis, which gives immediate cross-service
//! visibility and O(1) lookups.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::error::AuthError;
use crate::revocation::{dedupe, RevocationRecord, RevocationStore};

/// Shared, durable revocation store on Redis.
pub struct RedisRevocationStore {
    conn: Arc<RwLock<ConnectionManager>>,
}

impl RedisRevocationStore {
    /// Connect to Redis at `redis_url`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] when the connection cannot be
    /// established.
    pub async fn new(redis_url: &str) -> Result<Self, AuthError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn: Arc::new(RwLock::new(conn)),
        })
    }

    fn key(jti: &str) -> String {
        format!("revoked:{jti}")
    }
}

#[async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, records: &[RevocationRecord]) -> Result<(), AuthError> {
        let unique = dedupe(records);
        if unique.is_empty() {
            return Ok(());
        }

        let mut conn = self.conn.write().await;
        for record in &unique {
            let value = serde_json::to_string(record)
                .map_err(|e| AuthError::internal(e.to_string()))?;
            // SET is an upsert: re-revoking an already-present jti simply
            // rewrites the record, so concurrent revokes cannot fail.
            conn.set_ex::<_, _, ()>(
                Self::key(&record.jti),
                value,
                record.retention().as_secs(),
            )
            .await?;
        }

        crate::metrics::record_revocations("redis", unique.len());
        info!(count = unique.len(), "recorded token revocations");
        Ok(())
    }

    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError> {
        let mut conn = self.conn.write().await;
        let exists: bool = conn.exists(Self::key(jti)).await?;
        Ok(exists)
    }
}
