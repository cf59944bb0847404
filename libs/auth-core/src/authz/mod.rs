//! Hierarchical authorization decisions with cache-aside memoization.
//!
//! Resources form a three-level hierarchy (board -> table -> task) and every
//! level resolves access the same way: the principal is either the owning
//! board's owner or one of its collaborators. The durable lookup is the
//! caller-supplied [`AclLoader`]; this module memoizes its result per
//! `(resource, principal)` pair and keeps the cache honest by requiring
//! every ownership/collaborator mutation to evict before it responds.
//!
//! Caching here is plain function wrapping (populate on miss, evict on
//! mutation) with every eviction site explicit in the calling code.

pub mod acl;
pub mod cache;
pub mod redis;

use std::sync::Arc;

use tracing::warn;

use crate::error::AuthError;
use crate::metrics;

pub use acl::{Access, AccessDecision, AclLoader, ResourceAcl};
pub use cache::{DecisionCache, InMemoryDecisionCache};
pub use redis::RedisDecisionCache;

/// Resolves and memoizes access decisions.
pub struct AccessResolver {
    cache: Arc<dyn DecisionCache>,
}

impl AccessResolver {
    /// Create a resolver over the given decision cache.
    #[must_use]
    pub fn new(cache: Arc<dyn DecisionCache>) -> Self {
        Self { cache }
    }

    /// Decide whether `principal_id` may access `resource_id`.
    ///
    /// Serves a cached decision when one exists; otherwise consults
    /// `loader`, computes, caches, and returns. The cache is a performance
    /// layer only: any cache failure logs a warning and degrades to the
    /// direct loader path rather than failing the request.
    ///
    /// # Errors
    ///
    /// [`AuthError::NotFound`] when the resource does not exist, or
    /// whatever `loader` fails with. Never a cache error.
    pub async fn resolve_access(
        &self,
        resource_id: &str,
        principal_id: &str,
        loader: &dyn AclLoader,
    ) -> Result<AccessDecision, AuthError> {
        match self.cache.get(resource_id, principal_id).await {
            Ok(Some(decision)) => {
                metrics::record_authz_cache("hit");
                return Ok(decision);
            }
            Ok(None) => metrics::record_authz_cache("miss"),
            Err(err) => {
                warn!(
                    resource = %resource_id,
                    error = %err,
                    "decision cache read failed; falling back to loader"
                );
                metrics::record_authz_cache("bypass");
            }
        }

        let acl = loader
            .load(resource_id)
            .await?
            .ok_or_else(|| AuthError::NotFound {
                resource: resource_id.to_string(),
            })?;

        let decision = AccessDecision::evaluate(&acl, principal_id);

        if let Err(err) = self
            .cache
            .put(&acl.board_id, resource_id, principal_id, &decision)
            .await
        {
            warn!(
                resource = %resource_id,
                error = %err,
                "decision cache write failed"
            );
        }

        Ok(decision)
    }

    /// Like [`resolve_access`](Self::resolve_access), but turns a negative
    /// decision into [`AuthError::Forbidden`].
    ///
    /// # Errors
    ///
    /// `Forbidden`, `NotFound`, or a loader error.
    pub async fn require_access(
        &self,
        resource_id: &str,
        principal_id: &str,
        loader: &dyn AclLoader,
    ) -> Result<AccessDecision, AuthError> {
        let decision = self
            .resolve_access(resource_id, principal_id, loader)
            .await?;

        if !decision.is_allowed() {
            return Err(AuthError::Forbidden {
                resource: resource_id.to_string(),
            });
        }

        Ok(decision)
    }

    /// Drop every cached decision for `resource_id`.
    ///
    /// Mutation paths that change ownership or collaborator membership
    /// must call this before returning their response; a failed eviction
    /// propagates so the mutation can abort instead of leaving a
    /// stale-allow window.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] when the cache backend fails the eviction.
    pub async fn evict(&self, resource_id: &str) -> Result<(), AuthError> {
        metrics::record_authz_cache("evict");
        self.cache.evict(resource_id).await
    }

    /// Drop cached decisions for a board and every table/task under it.
    ///
    /// Same contract as [`evict`](Self::evict); used by board-level
    /// mutations, whose collaborator changes affect the whole subtree.
    ///
    /// # Errors
    ///
    /// [`AuthError::Store`] when the cache backend fails the eviction.
    pub async fn evict_board(&self, board_id: &str) -> Result<(), AuthError> {
        metrics::record_authz_cache("evict");
        self.cache.evict_board(board_id).await
    }
}
