//! Mock implementations of auth-core collaborator traits.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use auth_core::authz::{AccessDecision, AclLoader, DecisionCache, ResourceAcl};
use auth_core::error::AuthError;
use auth_core::revocation::{RevocationRecord, RevocationStore};

/// ACL loader over an in-memory map, counting every load call.
///
/// The map is mutable so tests can replay ownership/collaborator mutations
/// and observe cache eviction behavior.
#[derive(Debug, Default)]
pub struct CountingAclLoader {
    acls: RwLock<HashMap<String, ResourceAcl>>,
    calls: AtomicUsize,
}

impl CountingAclLoader {
    /// Create a loader pre-populated with the given ACLs.
    #[must_use]
    pub fn new(acls: Vec<ResourceAcl>) -> Self {
        Self {
            acls: RwLock::new(
                acls.into_iter()
                    .map(|acl| (acl.resource_id.clone(), acl))
                    .collect(),
            ),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `load` calls observed.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Insert or replace an ACL.
    pub async fn upsert(&self, acl: ResourceAcl) {
        self.acls.write().await.insert(acl.resource_id.clone(), acl);
    }

    /// Add a collaborator to a stored ACL, as an ownership mutation would.
    pub async fn add_collaborator(&self, resource_id: &str, principal_id: &str) {
        if let Some(acl) = self.acls.write().await.get_mut(resource_id) {
            if !acl.collaborator_ids.iter().any(|id| id == principal_id) {
                acl.collaborator_ids.push(principal_id.to_string());
            }
        }
    }
}

#[async_trait]
impl AclLoader for CountingAclLoader {
    async fn load(&self, resource_id: &str) -> Result<Option<ResourceAcl>, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.acls.read().await.get(resource_id).cloned())
    }
}

/// Decision cache that fails every operation, for fail-open tests.
#[derive(Debug, Default)]
pub struct FailingDecisionCache;

#[async_trait]
impl DecisionCache for FailingDecisionCache {
    async fn get(
        &self,
        _resource_id: &str,
        _principal_id: &str,
    ) -> Result<Option<AccessDecision>, AuthError> {
        Err(AuthError::store("decision cache unavailable"))
    }

    async fn put(
        &self,
        _board_id: &str,
        _resource_id: &str,
        _principal_id: &str,
        _decision: &AccessDecision,
    ) -> Result<(), AuthError> {
        Err(AuthError::store("decision cache unavailable"))
    }

    async fn evict(&self, _resource_id: &str) -> Result<(), AuthError> {
        Err(AuthError::store("decision cache unavailable"))
    }

    async fn evict_board(&self, _board_id: &str) -> Result<(), AuthError> {
        Err(AuthError::store("decision cache unavailable"))
    }
}

/// Revocation store that fails every operation, for fail-closed tests.
#[derive(Debug, Default)]
pub struct FailingRevocationStore;

#[async_trait]
impl RevocationStore for FailingRevocationStore {
    async fn revoke(&self, _records: &[RevocationRecord]) -> Result<(), AuthError> {
        Err(AuthError::store("revocation store unavailable"))
    }

    async fn is_revoked(&self, _jti: &str) -> Result<bool, AuthError> {
        Err(AuthError::store("revocation store unavailable"))
    }
}
