//! Access control types for the board -> table -> task hierarchy.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AuthError;

/// Ownership data for one resource, as loaded from the durable store.
///
/// For a board, `board_id == resource_id`; for tables and tasks it names
/// the owning board, whose collaborator set governs the whole subtree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceAcl {
    /// The resource this ACL describes
    pub resource_id: String,
    /// The board at the root of the resource's hierarchy
    pub board_id: String,
    /// The owning user
    pub owner_id: String,
    /// Users granted access by the owner
    pub collaborator_ids: Vec<String>,
}

/// The outcome of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Access {
    /// Principal owns the resource or is a collaborator.
    Allowed,
    /// Resource exists but the principal has no access.
    Forbidden,
}

/// A memoized access decision for one `(resource, principal)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessDecision {
    /// Owner at decision time
    pub owner_id: String,
    /// Collaborators at decision time
    pub collaborator_ids: Vec<String>,
    /// The decision itself
    pub decision: Access,
    /// When the decision was computed
    pub cached_at: DateTime<Utc>,
}

impl AccessDecision {
    /// Compute the decision for `principal_id` against `acl`.
    #[must_use]
    pub fn evaluate(acl: &ResourceAcl, principal_id: &str) -> Self {
        let allowed = acl.owner_id == principal_id
            || acl.collaborator_ids.iter().any(|id| id == principal_id);

        Self {
            owner_id: acl.owner_id.clone(),
            collaborator_ids: acl.collaborator_ids.clone(),
            decision: if allowed {
                Access::Allowed
            } else {
                Access::Forbidden
            },
            cached_at: Utc::now(),
        }
    }

    /// Whether access was granted.
    #[must_use]
    pub const fn is_allowed(&self) -> bool {
        matches!(self.decision, Access::Allowed)
    }
}

/// Durable ACL lookup, implemented by each service over its own store.
///
/// Returning `Ok(None)` means the resource does not exist, kept distinct
/// from a negative decision so callers can tell 404 from 403.
#[async_trait]
pub trait AclLoader: Send + Sync {
    /// Load the ACL for `resource_id`, or `None` if it does not exist.
    ///
    /// # Errors
    ///
    /// Implementation-defined store errors; they propagate to the caller
    /// unchanged.
    async fn load(&self, resource_id: &str) -> Result<Option<ResourceAcl>, AuthError>;
}
