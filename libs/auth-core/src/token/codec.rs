//! Pure encode/decode between claims and the compact signed wire format.
//!
//! The codec owns exactly two things: signing a claim set into the
//! three-segment base64url wire form, and checking a signature on the way
//! back in. Expiry and revocation are the verifier's job, which keeps the
//! codec pure and independently testable.

use jsonwebtoken::{decode, encode, errors::ErrorKind, Header, Validation};
use std::time::Duration;

use crate::error::AuthError;
use crate::keys::{SigningKeys, VerifyingKeys};
use crate::token::claims::{Claims, Identity};

/// Header `typ` value for every token minted by the platform.
const TOKEN_TYPE: &str = "Bearer";

/// Stateless codec for signed tokens.
#[derive(Debug, Default, Clone, Copy)]
pub struct TokenCodec;

impl TokenCodec {
    /// Sign a full-claims access token.
    ///
    /// Stamps `iat`/`exp` from the current clock and generates a fresh
    /// `jti` per call; the returned [`Claims`] mirror exactly what was
    /// signed.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Key`] when the signing key is unusable.
    pub fn encode_access(
        &self,
        identity: &Identity,
        keys: &SigningKeys,
        ttl: Duration,
    ) -> Result<(String, Claims), AuthError> {
        let claims = Claims::access(identity, ttl);
        let token = self.sign(&claims, keys)?;
        Ok((token, claims))
    }

    /// Sign a minimal-claims refresh token for `subject`.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Key`] when the signing key is unusable.
    pub fn encode_refresh(
        &self,
        subject: &str,
        keys: &SigningKeys,
        ttl: Duration,
    ) -> Result<(String, Claims), AuthError> {
        let claims = Claims::refresh(subject, ttl);
        let token = self.sign(&claims, keys)?;
        Ok((token, claims))
    }

    fn sign(&self, claims: &Claims, keys: &SigningKeys) -> Result<String, AuthError> {
        let mut header = Header::new(keys.algorithm());
        header.typ = Some(TOKEN_TYPE.to_string());
        header.kid = Some(keys.key_id().to_string());

        encode(&header, claims, keys.encoding())
            .map_err(|e| AuthError::key(format!("token signing failed: {}", e.kind_label())))
    }

    /// Decode a token, verifying only its signature.
    ///
    /// Fails with [`AuthError::SignatureInvalid`] when the signature does
    /// not verify and [`AuthError::Malformed`] when the token is not
    /// structurally a signed token. Expiry and revocation are left to the
    /// verifier.
    ///
    /// # Errors
    ///
    /// See above; never returns `Expired` or `Revoked`.
    pub fn decode(&self, token: &str, keys: &VerifyingKeys) -> Result<Claims, AuthError> {
        let mut validation = Validation::new(keys.algorithm());
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = decode::<Claims>(token, keys.decoding(), &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::InvalidSignature => AuthError::SignatureInvalid,
                _ => AuthError::malformed(e.to_string()),
            }
        })?;

        Ok(data.claims)
    }
}

/// Short, key-material-free labels for signing failures.
trait KindLabel {
    fn kind_label(&self) -> &'static str;
}

impl KindLabel for jsonwebtoken::errors::Error {
    fn kind_label(&self) -> &'static str {
        match self.kind() {
            ErrorKind::InvalidRsaKey(_) => "invalid RSA key",
            ErrorKind::InvalidEcdsaKey => "invalid ECDSA key",
            ErrorKind::InvalidKeyFormat => "invalid key format",
            ErrorKind::RsaFailedSigning => "RSA signing failed",
            _ => "signing error",
        }
    }
}
