//! Access/refresh pair issuance.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::error::AuthError;
use crate::keys::SigningKeys;
use crate::metrics;
use crate::revocation::RevocationRecord;
use crate::token::claims::{Identity, TokenUse};
use crate::token::codec::TokenCodec;
use crate::token::verifier::VerifiedClaims;

/// A freshly minted access/refresh pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Short-lived token carrying the full identity claims
    pub access_token: String,
    /// Long-lived token used solely to mint new pairs
    pub refresh_token: String,
    /// When the access token expires
    pub access_expires_at: DateTime<Utc>,
}

/// The result of a refresh: a new pair plus the retired refresh token's
/// revocation record, which the refresh flow must persist.
#[derive(Debug, Clone)]
pub struct RotatedPair {
    /// The replacement pair
    pub pair: TokenPair,
    /// Revocation record for the refresh token that was just consumed
    pub retired: RevocationRecord,
}

/// Mints token pairs. Pure: signs and returns, no I/O.
///
/// Owned only by the issuing service; verifying services never construct
/// one. Unusable key material fails at [`SigningKeys`] construction, before
/// this type exists, so a running issuer can always sign.
pub struct TokenIssuer {
    codec: TokenCodec,
    keys: Arc<SigningKeys>,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenIssuer {
    /// Create an issuer with the given pair lifetimes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless `access_ttl` is strictly
    /// shorter than `refresh_ttl`.
    pub fn new(
        keys: Arc<SigningKeys>,
        access_ttl: Duration,
        refresh_ttl: Duration,
    ) -> Result<Self, AuthError> {
        if access_ttl >= refresh_ttl {
            return Err(AuthError::config(format!(
                "access TTL ({access_ttl:?}) must be shorter than refresh TTL ({refresh_ttl:?})"
            )));
        }

        Ok(Self {
            codec: TokenCodec,
            keys,
            access_ttl,
            refresh_ttl,
        })
    }

    /// Issue a new pair for `identity`.
    ///
    /// The two tokens get independently random `jti`s, so revoking one
    /// never implicitly revokes the other.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Key`] if signing fails.
    pub fn issue(&self, identity: &Identity) -> Result<TokenPair, AuthError> {
        let (access_token, access_claims) =
            self.codec
                .encode_access(identity, &self.keys, self.access_ttl)?;
        let (refresh_token, _) =
            self.codec
                .encode_refresh(&identity.user_id, &self.keys, self.refresh_ttl)?;

        metrics::record_token_issued(TokenUse::Access.as_str());
        metrics::record_token_issued(TokenUse::Refresh.as_str());
        info!(sub = %identity.user_id, "issued token pair");

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_at: access_claims.expires_at(),
        })
    }

    /// Mint a replacement pair against a verified refresh token.
    ///
    /// Rotation is unconditional: the returned [`RotatedPair::retired`]
    /// record must be written to the revocation store before the new pair
    /// is released to the client, so the consumed refresh token can never
    /// mint a second pair.
    ///
    /// The caller must have fully verified `refresh`, including its
    /// revocation check; the [`VerifiedClaims`] type enforces it.
    ///
    /// # Errors
    ///
    /// Rejects non-refresh tokens and subject mismatches; otherwise as
    /// [`issue`](Self::issue).
    pub fn reissue(
        &self,
        identity: &Identity,
        refresh: &VerifiedClaims,
    ) -> Result<RotatedPair, AuthError> {
        if refresh.token_use() != TokenUse::Refresh {
            return Err(AuthError::WrongTokenUse {
                expected: TokenUse::Refresh.as_str(),
                actual: refresh.token_use().as_str(),
            });
        }

        if refresh.subject() != identity.user_id {
            warn!(
                token_sub = %refresh.subject(),
                identity_sub = %identity.user_id,
                "refresh token subject mismatch"
            );
            metrics::record_security_event("refresh_subject_mismatch");
            return Err(AuthError::Unauthenticated);
        }

        let pair = self.issue(identity)?;
        let retired = RevocationRecord::new(refresh.jti().to_string(), refresh.expires_at());

        Ok(RotatedPair { pair, retired })
    }
}
