//! Shared revocation list for issued tokens.
//!
//! Every verifying service consults the same durable store, so a revocation
//! is visible platform-wide immediately after `revoke` returns; there are
//! no per-service replicas to converge. A token id, once revoked, stays
//! untrusted. Its record may only be dropped after the token's own natural
//! expiry, when the expiry check rejects it anyway.

pub mod memory;
pub mod redis;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::AuthError;

pub use memory::InMemoryRevocationStore;
pub use redis::RedisRevocationStore;

/// A single revoked token id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevocationRecord {
    /// The revoked token id
    pub jti: String,
    /// When the revocation was recorded
    pub revoked_at: DateTime<Utc>,
    /// The token's own expiry; the record is retained at least this long
    pub expires_at: DateTime<Utc>,
}

impl RevocationRecord {
    /// Record a revocation for `jti` on a token expiring at `expires_at`.
    #[must_use]
    pub fn new(jti: impl Into<String>, expires_at: DateTime<Utc>) -> Self {
        Self {
            jti: jti.into(),
            revoked_at: Utc::now(),
            expires_at,
        }
    }

    /// How long the backing store must keep this record.
    ///
    /// At least one second even for already-expired tokens, so a revoke
    /// racing natural expiry still lands.
    #[must_use]
    pub fn retention(&self) -> Duration {
        let secs = (self.expires_at - self.revoked_at).num_seconds().max(1);
        Duration::from_secs(secs as u64)
    }
}

/// Durable set of revoked token ids, shared by every service process.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record the given token ids as revoked.
    ///
    /// Idempotent: duplicate ids within the batch or already-present ids
    /// produce neither duplicate records nor errors.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] when the backing store is unreachable.
    async fn revoke(&self, records: &[RevocationRecord]) -> Result<(), AuthError>;

    /// Point lookup: has this token id been revoked?
    ///
    /// Called on every authenticated request, so implementations must be
    /// O(1) on the token id.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Store`] when the backing store is unreachable;
    /// verification treats that as "cannot confirm not-revoked" and rejects.
    async fn is_revoked(&self, jti: &str) -> Result<bool, AuthError>;
}

/// Drop records whose jti repeats, keeping the first occurrence.
pub(crate) fn dedupe(records: &[RevocationRecord]) -> Vec<&RevocationRecord> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter(|record| seen.insert(record.jti.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_spans_until_token_expiry() {
        let record = RevocationRecord::new("jti-1", Utc::now() + chrono::Duration::hours(1));
        let retention = record.retention();
        assert!(retention >= Duration::from_secs(3590));
        assert!(retention <= Duration::from_secs(3600));
    }

    #[test]
    fn retention_never_zero_for_expired_tokens() {
        let record = RevocationRecord::new("jti-1", Utc::now() - chrono::Duration::hours(1));
        assert_eq!(record.retention(), Duration::from_secs(1));
    }

    #[test]
    fn dedupe_keeps_first_occurrence() {
        let expiry = Utc::now() + chrono::Duration::hours(1);
        let records = vec![
            RevocationRecord::new("a", expiry),
            RevocationRecord::new("b", expiry),
            RevocationRecord::new("a", expiry),
        ];

        let unique = dedupe(&records);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique[0].jti, "a");
        assert_eq!(unique[1].jti, "b");
    }
}
