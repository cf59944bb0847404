//! Decision cache trait and the in-process implementation.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use crate::authz::acl::AccessDecision;
use crate::error::AuthError;

/// Storage for memoized access decisions.
///
/// `put` records the owning board alongside the entry so board-level
/// evictions can find every table/task entry under it. All operations are
/// fallible; the resolver treats read/write failures as cache misses and
/// eviction failures as fatal to the mutation.
#[async_trait]
pub trait DecisionCache: Send + Sync {
    /// Fetch a cached decision, if any.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on backend failure.
    async fn get(
        &self,
        resource_id: &str,
        principal_id: &str,
    ) -> Result<Option<AccessDecision>, AuthError>;

    /// Store a decision under `(resource_id, principal_id)`, indexed by
    /// the owning `board_id`.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on backend failure.
    async fn put(
        &self,
        board_id: &str,
        resource_id: &str,
        principal_id: &str,
        decision: &AccessDecision,
    ) -> Result<(), AuthError>;

    /// Remove every principal's entry for one resource.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on backend failure.
    async fn evict(&self, resource_id: &str) -> Result<(), AuthError>;

    /// Remove every entry for a board and all resources indexed under it.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] on backend failure.
    async fn evict_board(&self, board_id: &str) -> Result<(), AuthError>;
}

#[derive(Debug, Default)]
struct CacheState {
    entries: HashMap<(String, String), AccessDecision>,
    board_index: HashMap<String, HashSet<String>>,
}

/// In-process decision cache.
///
/// A single lock over entries and the board index keeps evictions atomic:
/// a reader acquiring the lock after an eviction completes can never see a
/// removed entry.
#[derive(Debug, Default)]
pub struct InMemoryDecisionCache {
    state: RwLock<CacheState>,
}

impl InMemoryDecisionCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of cached decisions, for assertions in tests.
    pub async fn len(&self) -> usize {
        self.state.read().await.entries.len()
    }

    /// Whether the cache holds no decisions.
    pub async fn is_empty(&self) -> bool {
        self.state.read().await.entries.is_empty()
    }
}

#[async_trait]
impl DecisionCache for InMemoryDecisionCache {
    async fn get(
        &self,
        resource_id: &str,
        principal_id: &str,
    ) -> Result<Option<AccessDecision>, AuthError> {
        let state = self.state.read().await;
        Ok(state
            .entries
            .get(&(resource_id.to_string(), principal_id.to_string()))
            .cloned())
    }

    async fn put(
        &self,
        board_id: &str,
        resource_id: &str,
        principal_id: &str,
        decision: &AccessDecision,
    ) -> Result<(), AuthError> {
        let mut state = self.state.write().await;
        state.entries.insert(
            (resource_id.to_string(), principal_id.to_string()),
            decision.clone(),
        );
        state
            .board_index
            .entry(board_id.to_string())
            .or_default()
            .insert(resource_id.to_string());
        Ok(())
    }

    async fn evict(&self, resource_id: &str) -> Result<(), AuthError> {
        let mut state = self.state.write().await;
        state
            .entries
            .retain(|(resource, _), _| resource != resource_id);
        for resources in state.board_index.values_mut() {
            resources.remove(resource_id);
        }
        Ok(())
    }

    async fn evict_board(&self, board_id: &str) -> Result<(), AuthError> {
        let mut state = self.state.write().await;

        let mut doomed = state.board_index.remove(board_id).unwrap_or_default();
        doomed.insert(board_id.to_string());

        state
            .entries
            .retain(|(resource, _), _| !doomed.contains(resource));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authz::acl::{AccessDecision, ResourceAcl};

    fn decision_for(principal: &str) -> AccessDecision {
        let acl = ResourceAcl {
            resource_id: "task-1".to_string(),
            board_id: "board-1".to_string(),
            owner_id: "owner".to_string(),
            collaborator_ids: vec![],
        };
        AccessDecision::evaluate(&acl, principal)
    }

    #[tokio::test]
    async fn put_get_evict() {
        let cache = InMemoryDecisionCache::new();
        let decision = decision_for("owner");

        cache
            .put("board-1", "task-1", "owner", &decision)
            .await
            .unwrap();
        assert_eq!(
            cache.get("task-1", "owner").await.unwrap(),
            Some(decision)
        );

        cache.evict("task-1").await.unwrap();
        assert_eq!(cache.get("task-1", "owner").await.unwrap(), None);
    }

    #[tokio::test]
    async fn evict_drops_every_principal_for_the_resource() {
        let cache = InMemoryDecisionCache::new();
        cache
            .put("board-1", "task-1", "alice", &decision_for("alice"))
            .await
            .unwrap();
        cache
            .put("board-1", "task-1", "bob", &decision_for("bob"))
            .await
            .unwrap();
        cache
            .put("board-1", "task-2", "alice", &decision_for("alice"))
            .await
            .unwrap();

        cache.evict("task-1").await.unwrap();

        assert_eq!(cache.get("task-1", "alice").await.unwrap(), None);
        assert_eq!(cache.get("task-1", "bob").await.unwrap(), None);
        assert!(cache.get("task-2", "alice").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn board_eviction_includes_the_board_itself() {
        let cache = InMemoryDecisionCache::new();
        cache
            .put("board-1", "board-1", "alice", &decision_for("alice"))
            .await
            .unwrap();
        cache
            .put("board-1", "task-1", "alice", &decision_for("alice"))
            .await
            .unwrap();
        cache
            .put("board-2", "task-9", "alice", &decision_for("alice"))
            .await
            .unwrap();

        cache.evict_board("board-1").await.unwrap();

        assert!(!cache.is_empty().await);
        assert_eq!(cache.get("board-1", "alice").await.unwrap(), None);
        assert_eq!(cache.get("task-1", "alice").await.unwrap(), None);
        assert!(cache.get("task-9", "alice").await.unwrap().is_some());
    }
}
