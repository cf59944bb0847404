//! Token verification: signature, then expiry, then revocation.
//!
//! The checks run in exactly that order and stop at the first failure, so a
//! garbage or unsigned token is rejected by cheap local work and never
//! reaches the revocation store. The type-state [`Token`] makes the order
//! structural: each check is only available once the previous one passed,
//! and claims can only be read off a fully verified token.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::AuthError;
use crate::keys::VerifyingKeys;
use crate::metrics;
use crate::revocation::RevocationStore;
use crate::token::claims::{Claims, TokenUse};
use crate::token::codec::TokenCodec;

mod private {
    pub trait Sealed {}
}

/// Marker trait for verification states.
pub trait VerifyState: private::Sealed {
    /// State name for debugging.
    fn state_name() -> &'static str;
}

/// Signature verified; expiry and revocation still unchecked.
pub struct SignatureChecked;
impl private::Sealed for SignatureChecked {}
impl VerifyState for SignatureChecked {
    fn state_name() -> &'static str {
        "SignatureChecked"
    }
}

/// Signature and expiry verified; revocation still unchecked.
pub struct TimestampChecked;
impl private::Sealed for TimestampChecked {}
impl VerifyState for TimestampChecked {
    fn state_name() -> &'static str {
        "TimestampChecked"
    }
}

/// All checks passed.
pub struct Verified;
impl private::Sealed for Verified {}
impl VerifyState for Verified {
    fn state_name() -> &'static str {
        "Verified"
    }
}

/// A raw token that passed only the structural pre-check.
#[derive(Debug)]
pub struct UnverifiedToken {
    raw: String,
}

impl UnverifiedToken {
    /// Structurally pre-check a raw token: exactly three non-empty
    /// dot-separated segments. Costs a scan of the string, nothing more.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Malformed`] for anything else.
    pub fn parse(raw: &str) -> Result<Self, AuthError> {
        let segments: Vec<&str> = raw.split('.').collect();
        if segments.len() != 3 || segments.iter().any(|s| s.is_empty()) {
            return Err(AuthError::malformed("expected three token segments"));
        }

        Ok(Self {
            raw: raw.to_string(),
        })
    }

    /// Verify the signature and decode the claims.
    ///
    /// # Errors
    ///
    /// [`AuthError::SignatureInvalid`] or [`AuthError::Malformed`].
    pub fn check_signature(
        self,
        codec: &TokenCodec,
        keys: &VerifyingKeys,
    ) -> Result<Token<SignatureChecked>, AuthError> {
        let claims = codec.decode(&self.raw, keys)?;
        Ok(Token {
            claims,
            _state: PhantomData,
        })
    }
}

/// A token whose claims are trusted up to the current state's checks.
#[derive(Debug)]
pub struct Token<State: VerifyState> {
    claims: Claims,
    _state: PhantomData<State>,
}

impl<State: VerifyState> Token<State> {
    /// Current state name, for debugging.
    #[must_use]
    pub fn state_name(&self) -> &'static str {
        State::state_name()
    }
}

impl Token<SignatureChecked> {
    /// Reject tokens past their expiry.
    ///
    /// # Errors
    ///
    /// [`AuthError::Expired`].
    pub fn check_expiry(self) -> Result<Token<TimestampChecked>, AuthError> {
        if self.claims.is_expired() {
            return Err(AuthError::Expired {
                expired_at: self.claims.expires_at(),
            });
        }

        Ok(Token {
            claims: self.claims,
            _state: PhantomData,
        })
    }
}

impl Token<TimestampChecked> {
    /// Reject tokens whose id is on the shared revocation list.
    ///
    /// A store failure propagates as [`AuthError::Store`]: when the list
    /// cannot be consulted the token cannot be trusted, so verification
    /// fails closed.
    ///
    /// # Errors
    ///
    /// [`AuthError::Revoked`] or [`AuthError::Store`].
    pub async fn check_revocation(
        self,
        store: &dyn RevocationStore,
    ) -> Result<Token<Verified>, AuthError> {
        if store.is_revoked(&self.claims.jti).await? {
            warn!(
                jti = %self.claims.jti,
                sub = %self.claims.sub,
                "revoked token presented"
            );
            metrics::record_security_event("revoked_token_use");
            return Err(AuthError::Revoked {
                jti: self.claims.jti.clone(),
            });
        }

        Ok(Token {
            claims: self.claims,
            _state: PhantomData,
        })
    }
}

impl Token<Verified> {
    /// Claims access, only available once every check passed.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Consume the token into its portable verified form.
    #[must_use]
    pub fn into_verified(self) -> VerifiedClaims {
        VerifiedClaims {
            claims: self.claims,
        }
    }
}

/// Claims that passed signature, expiry, and revocation checks.
///
/// This is the only claims-bearing type this crate hands to business logic;
/// there is no public path from a raw token to claims that skips a check.
#[derive(Debug, Clone)]
pub struct VerifiedClaims {
    claims: Claims,
}

impl VerifiedClaims {
    /// The full verified claim set.
    #[must_use]
    pub fn claims(&self) -> &Claims {
        &self.claims
    }

    /// The subject user id.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.claims.sub
    }

    /// The unique token id.
    #[must_use]
    pub fn jti(&self) -> &str {
        &self.claims.jti
    }

    /// The token's use class.
    #[must_use]
    pub fn token_use(&self) -> TokenUse {
        self.claims.token_use
    }

    /// The token's expiry.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }

    /// Unwrap into the inner claims.
    #[must_use]
    pub fn into_claims(self) -> Claims {
        self.claims
    }
}

/// Facade running the full verification chain.
///
/// Constructed once per service from the distributed public key and the
/// shared revocation store; the same verifier runs at the edge gateway and
/// inside every downstream service.
pub struct TokenVerifier {
    codec: TokenCodec,
    keys: VerifyingKeys,
    revocation: Arc<dyn RevocationStore>,
}

impl TokenVerifier {
    /// Create a verifier over the given public key and revocation store.
    #[must_use]
    pub fn new(keys: VerifyingKeys, revocation: Arc<dyn RevocationStore>) -> Self {
        Self {
            codec: TokenCodec,
            keys,
            revocation,
        }
    }

    /// Run signature -> expiry -> revocation and return the verified claims.
    ///
    /// # Errors
    ///
    /// The first failing check's error; see [`Token`] for the breakdown.
    pub async fn verify(&self, raw: &str) -> Result<VerifiedClaims, AuthError> {
        let started = Instant::now();
        let outcome = self.run(raw).await;

        metrics::record_verification(
            match &outcome {
                Ok(_) => "ok",
                Err(err) => outcome_label(err),
            },
            started.elapsed().as_secs_f64(),
        );

        outcome
    }

    /// [`verify`](Self::verify), additionally requiring the token's use
    /// class to match `expected`.
    ///
    /// A refresh token presented where an access token belongs (or the
    /// reverse) is a misuse of an otherwise valid credential; it is
    /// rejected and logged.
    ///
    /// # Errors
    ///
    /// As [`verify`](Self::verify), plus [`AuthError::WrongTokenUse`].
    pub async fn verify_expecting(
        &self,
        raw: &str,
        expected: TokenUse,
    ) -> Result<VerifiedClaims, AuthError> {
        let verified = self.verify(raw).await?;
        let actual = verified.token_use();
        if actual != expected {
            warn!(
                sub = %verified.subject(),
                expected = expected.as_str(),
                actual = actual.as_str(),
                "token use mismatch"
            );
            return Err(AuthError::WrongTokenUse {
                expected: expected.as_str(),
                actual: actual.as_str(),
            });
        }
        Ok(verified)
    }

    async fn run(&self, raw: &str) -> Result<VerifiedClaims, AuthError> {
        let token = UnverifiedToken::parse(raw)?;
        let token = token.check_signature(&self.codec, &self.keys)?;
        let token = token.check_expiry()?;
        let token = token.check_revocation(self.revocation.as_ref()).await?;
        Ok(token.into_verified())
    }
}

fn outcome_label(err: &AuthError) -> &'static str {
    match err {
        AuthError::Malformed { .. } => "malformed",
        AuthError::SignatureInvalid => "signature_invalid",
        AuthError::Expired { .. } => "expired",
        AuthError::Revoked { .. } => "revoked",
        AuthError::Store(_) => "store_error",
        _ => "error",
    }
}
