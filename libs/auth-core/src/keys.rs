//! Key material for token signing and verification.
//!
//! The issuing service owns the full pair ([`SigningKeys`]); every other
//! service is handed only the public half ([`VerifyingKeys`]). Both are
//! constructed once at startup from PEM-encoded keys and injected into the
//! issuer/verifier explicitly; there is no process-global key state.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey};

use crate::error::AuthError;

/// Signing algorithms accepted for production key pairs.
///
/// The algorithm is fixed for the lifetime of a key pair; rotating it means
/// distributing a new pair, not flipping a flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JwtAlgorithm {
    /// RSA with SHA-256
    RS256,
    /// ECDSA with P-256 and SHA-256
    ES256,
}

impl JwtAlgorithm {
    /// Parse an algorithm name as it appears in configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error for anything other than the supported
    /// asymmetric algorithms.
    pub fn parse(s: &str) -> Result<Self, AuthError> {
        match s.to_uppercase().as_str() {
            "RS256" => Ok(Self::RS256),
            "ES256" => Ok(Self::ES256),
            _ => Err(AuthError::config(format!("unsupported JWT algorithm: {s}"))),
        }
    }

    /// Algorithm name as written into token headers.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::RS256 => "RS256",
            Self::ES256 => "ES256",
        }
    }

    pub(crate) const fn algorithm(&self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::ES256 => Algorithm::ES256,
        }
    }
}

impl std::fmt::Display for JwtAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public key material distributed to every verifying service.
#[derive(Clone)]
pub struct VerifyingKeys {
    algorithm: Algorithm,
    decoding: DecodingKey,
}

impl VerifyingKeys {
    /// Build verifying keys from a PEM-encoded public key.
    ///
    /// # Errors
    ///
    /// Fails if the PEM cannot be parsed for the given algorithm. Callers
    /// must treat this as fatal and abort service startup.
    pub fn from_pem(algorithm: JwtAlgorithm, public_pem: &[u8]) -> Result<Self, AuthError> {
        let decoding = match algorithm {
            JwtAlgorithm::RS256 => DecodingKey::from_rsa_pem(public_pem),
            JwtAlgorithm::ES256 => DecodingKey::from_ec_pem(public_pem),
        }
        .map_err(|e| AuthError::key(format!("unusable public key PEM: {e}")))?;

        Ok(Self {
            algorithm: algorithm.algorithm(),
            decoding,
        })
    }

    /// Symmetric-secret keys for tests and local development only.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            algorithm: Algorithm::HS256,
            decoding: DecodingKey::from_secret(secret),
        }
    }

    pub(crate) const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) const fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

impl std::fmt::Debug for VerifyingKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VerifyingKeys")
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}

/// Full key pair held exclusively by the issuing service.
pub struct SigningKeys {
    key_id: String,
    algorithm: Algorithm,
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl SigningKeys {
    /// Build signing keys from a PEM-encoded private/public pair.
    ///
    /// Both halves are parsed eagerly so a corrupt or mismatched key fails
    /// here, at startup, rather than on the first signing request.
    ///
    /// # Errors
    ///
    /// Fails if either PEM cannot be parsed for the given algorithm.
    pub fn from_pem(
        algorithm: JwtAlgorithm,
        key_id: impl Into<String>,
        private_pem: &[u8],
        public_pem: &[u8],
    ) -> Result<Self, AuthError> {
        let encoding = match algorithm {
            JwtAlgorithm::RS256 => EncodingKey::from_rsa_pem(private_pem),
            JwtAlgorithm::ES256 => EncodingKey::from_ec_pem(private_pem),
        }
        .map_err(|e| AuthError::key(format!("unusable private key PEM: {e}")))?;

        let public = VerifyingKeys::from_pem(algorithm, public_pem)?;

        Ok(Self {
            key_id: key_id.into(),
            algorithm: algorithm.algorithm(),
            encoding,
            decoding: public.decoding,
        })
    }

    /// Symmetric-secret keys for tests and local development only.
    #[must_use]
    pub fn from_secret(key_id: impl Into<String>, secret: &[u8]) -> Self {
        Self {
            key_id: key_id.into(),
            algorithm: Algorithm::HS256,
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }

    /// The public half, for handing to in-process verifiers.
    #[must_use]
    pub fn verifying(&self) -> VerifyingKeys {
        VerifyingKeys {
            algorithm: self.algorithm,
            decoding: self.decoding.clone(),
        }
    }

    /// Key id written into token headers.
    #[must_use]
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    pub(crate) const fn algorithm(&self) -> Algorithm {
        self.algorithm
    }

    pub(crate) const fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }
}

impl std::fmt::Debug for SigningKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningKeys")
            .field("key_id", &self.key_id)
            .field("algorithm", &self.algorithm)
            .finish_non_exhaustive()
    }
}
