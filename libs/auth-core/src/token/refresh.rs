//! Refresh flow: verify the presented refresh token, rotate, revoke.
//!
//! Runs only in the issuing service. The ordering is load-bearing:
//! 1. fully verify the presented refresh token; a revoked one (logged-out
//!    session) must never mint a new pair;
//! 2. mint the replacement pair;
//! 3. revoke the consumed refresh token BEFORE releasing the new pair, so
//!    a captured old token cannot be replayed.
//!
//! If step 3 fails the client gets an error and retries with the old,
//! still-valid refresh token; no pair leaks without its predecessor dying.

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::AuthError;
use crate::metrics;
use crate::revocation::RevocationStore;
use crate::token::claims::{Identity, TokenUse};
use crate::token::issuer::{TokenIssuer, TokenPair};
use crate::token::verifier::TokenVerifier;

/// Orchestrates refresh-token rotation against the shared stores.
pub struct RefreshFlow {
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier>,
    revocation: Arc<dyn RevocationStore>,
}

impl RefreshFlow {
    /// Wire the flow over the issuing service's issuer, verifier, and
    /// revocation store.
    #[must_use]
    pub fn new(
        issuer: Arc<TokenIssuer>,
        verifier: Arc<TokenVerifier>,
        revocation: Arc<dyn RevocationStore>,
    ) -> Self {
        Self {
            issuer,
            verifier,
            revocation,
        }
    }

    /// Exchange a refresh token for a fresh pair.
    ///
    /// `identity` is the caller-resolved current profile of the subject;
    /// the new access token is minted from it, not from the stale claims
    /// inside the old tokens.
    ///
    /// # Errors
    ///
    /// Any verification failure on the presented token (including
    /// `Revoked` for logged-out sessions), subject mismatch, or a store
    /// failure while retiring the old token.
    pub async fn refresh(
        &self,
        refresh_token: &str,
        identity: &Identity,
    ) -> Result<TokenPair, AuthError> {
        let verified = match self
            .verifier
            .verify_expecting(refresh_token, TokenUse::Refresh)
            .await
        {
            Ok(verified) => verified,
            Err(err) => {
                if matches!(err, AuthError::Revoked { .. }) {
                    warn!(sub = %identity.user_id, "refresh attempted with revoked token");
                    metrics::record_security_event("revoked_refresh_replay");
                }
                metrics::record_refresh("rejected");
                return Err(err);
            }
        };

        let rotated = self.issuer.reissue(identity, &verified)?;
        self.revocation.revoke(&[rotated.retired]).await?;

        metrics::record_refresh("rotated");
        info!(sub = %identity.user_id, "rotated refresh token");

        Ok(rotated.pair)
    }
}
