//! Redis-backed decision cache shared by every service process.
//!
//! Key layout:
//! - `authz:{resource}:{principal}`: the JSON decision entry
//! - `authz:index:{resource}`: set of principals with a cached entry
//! - `authz:board:{board}`: set of resources cached under the board
//!
//! Entries expire after a bounded TTL as a safety net; explicit eviction
//! at mutation sites remains the correctness mechanism.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::authz::acl::AccessDecision;
use crate::authz::cache::DecisionCache;
use crate::error::AuthError;

/// Shared decision cache on Redis.
pub struct RedisDecisionCache {
    conn: Arc<RwLock<ConnectionManager>>,
    default_ttl: Duration,
}

impl RedisDecisionCache {
    /// Connect to Redis at `redis_url` with the given entry TTL.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] when the connection cannot be
    /// established.
    pub async fn new(redis_url: &str, default_ttl: Duration) -> Result<Self, AuthError> {
        let client = redis::Client::open(redis_url)?;
        let conn = ConnectionManager::new(client).await?;

        Ok(Self {
            conn: Arc::new(RwLock::new(conn)),
            default_ttl,
        })
    }

    fn entry_key(resource_id: &str, principal_id: &str) -> String {
        format!("authz:{resource_id}:{principal_id}")
    }

    fn index_key(resource_id: &str) -> String {
        format!("authz:index:{resource_id}")
    }

    fn board_key(board_id: &str) -> String {
        format!("authz:board:{board_id}")
    }

    async fn evict_resource(
        conn: &mut ConnectionManager,
        resource_id: &str,
    ) -> Result<(), AuthError> {
        let index_key = Self::index_key(resource_id);
        let principals: Vec<String> = conn.smembers(&index_key).await?;

        for principal in &principals {
            conn.del::<_, ()>(Self::entry_key(resource_id, principal))
                .await?;
        }
        conn.del::<_, ()>(&index_key).await?;

        Ok(())
    }
}

#[async_trait]
impl DecisionCache for RedisDecisionCache {
    async fn get(
        &self,
        resource_id: &str,
        principal_id: &str,
    ) -> Result<Option<AccessDecision>, AuthError> {
        let mut conn = self.conn.write().await;
        let value: Option<String> = conn
            .get(Self::entry_key(resource_id, principal_id))
            .await?;

        match value {
            Some(json) => {
                let decision: AccessDecision = serde_json::from_str(&json)
                    .map_err(|e| AuthError::internal(format!("corrupt cache entry: {e}")))?;
                Ok(Some(decision))
            }
            None => Ok(None),
        }
    }

    async fn put(
        &self,
        board_id: &str,
        resource_id: &str,
        principal_id: &str,
        decision: &AccessDecision,
    ) -> Result<(), AuthError> {
        let json = serde_json::to_string(decision)
            .map_err(|e| AuthError::internal(e.to_string()))?;
        let ttl = self.default_ttl.as_secs();

        let mut conn = self.conn.write().await;
        conn.set_ex::<_, _, ()>(Self::entry_key(resource_id, principal_id), json, ttl)
            .await?;

        // Index entries outlive their members by at most the same TTL;
        // eviction of an already-expired member is a no-op.
        let index_key = Self::index_key(resource_id);
        conn.sadd::<_, _, ()>(&index_key, principal_id).await?;
        conn.expire::<_, ()>(&index_key, ttl as i64).await?;

        let board_key = Self::board_key(board_id);
        conn.sadd::<_, _, ()>(&board_key, resource_id).await?;
        conn.expire::<_, ()>(&board_key, ttl as i64).await?;

        Ok(())
    }

    async fn evict(&self, resource_id: &str) -> Result<(), AuthError> {
        let mut conn = self.conn.write().await;
        Self::evict_resource(&mut conn, resource_id).await
    }

    async fn evict_board(&self, board_id: &str) -> Result<(), AuthError> {
        let mut conn = self.conn.write().await;
        let board_key = Self::board_key(board_id);

        let mut resources: Vec<String> = conn.smembers(&board_key).await?;
        // Board-level decisions are cached under the board's own id.
        resources.push(board_id.to_string());

        for resource in &resources {
            Self::evict_resource(&mut conn, resource).await?;
        }
        conn.del::<_, ()>(&board_key).await?;

        Ok(())
    }
}
