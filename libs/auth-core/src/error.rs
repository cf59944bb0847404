//! Error types for the authentication core.
//!
//! Internally every failure is precise ([`AuthError`]); at the transport
//! boundary all verification failures collapse into a single
//! `Unauthenticated` rejection so clients cannot probe which check failed.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Patterns that must never leak into client-facing messages.
const SENSITIVE_PATTERNS: &[&str] = &[
    "password",
    "secret",
    "token",
    "key",
    "credential",
    "bearer",
    "authorization",
    "private",
];

/// Error type for all token lifecycle and authorization operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum AuthError {
    /// Token structure could not be parsed.
    #[error("token malformed: {reason}")]
    Malformed {
        /// Description of the malformation
        reason: String,
    },

    /// Token signature verification failed.
    #[error("token signature invalid")]
    SignatureInvalid,

    /// Token is past its expiry.
    #[error("token expired at {expired_at}")]
    Expired {
        /// When the token expired
        expired_at: DateTime<Utc>,
    },

    /// Token id is present in the revocation store.
    #[error("token revoked")]
    Revoked {
        /// The revoked token id
        jti: String,
    },

    /// A token of a different use class was presented.
    #[error("wrong token use: expected {expected}, got {actual}")]
    WrongTokenUse {
        /// The use class the caller required
        expected: &'static str,
        /// The use class carried by the token
        actual: &'static str,
    },

    /// No credentials were supplied where they are required.
    #[error("authentication required")]
    Unauthenticated,

    /// Authenticated principal lacks access to the resource.
    #[error("access to resource {resource} denied")]
    Forbidden {
        /// The resource that was requested
        resource: String,
    },

    /// The requested resource does not exist.
    #[error("resource {resource} not found")]
    NotFound {
        /// The resource that was requested
        resource: String,
    },

    /// Key material is absent or unusable. Fatal at startup.
    #[error("key material error: {0}")]
    Key(String),

    /// Configuration is missing or invalid. Fatal at startup.
    #[error("configuration error: {0}")]
    Config(String),

    /// Backing store (revocation list, decision cache) failed.
    #[error("store error: {0}")]
    Store(String),

    /// Unclassified internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Create a [`AuthError::Malformed`] with a sanitized reason.
    #[must_use]
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: sanitize_message(&reason.into()),
        }
    }

    /// Create a [`AuthError::Key`] error.
    #[must_use]
    pub fn key(message: impl Into<String>) -> Self {
        Self::Key(message.into())
    }

    /// Create a [`AuthError::Config`] error.
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a [`AuthError::Store`] error.
    #[must_use]
    pub fn store(message: impl Into<String>) -> Self {
        Self::Store(message.into())
    }

    /// Create a [`AuthError::Internal`] error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Map this error to its client-facing rejection.
    ///
    /// Every verification failure maps to `Unauthenticated` regardless of
    /// which check tripped. A store failure during verification also maps
    /// to `Unauthenticated`: when the revocation list cannot be consulted
    /// the token cannot be confirmed un-revoked, so verification fails
    /// closed.
    #[must_use]
    pub fn rejection(&self) -> RejectionKind {
        match self {
            Self::Malformed { .. }
            | Self::SignatureInvalid
            | Self::Expired { .. }
            | Self::Revoked { .. }
            | Self::WrongTokenUse { .. }
            | Self::Unauthenticated
            | Self::Store(_) => RejectionKind::Unauthenticated,
            Self::Forbidden { .. } => RejectionKind::Forbidden,
            Self::NotFound { .. } => RejectionKind::NotFound,
            Self::Key(_) | Self::Config(_) | Self::Internal(_) => RejectionKind::Internal,
        }
    }
}

/// Client-facing rejection classes.
///
/// This is the only error granularity that leaves the process; the precise
/// [`AuthError`] stays in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionKind {
    /// Credentials absent or failed verification (HTTP 401, handshake refusal).
    Unauthenticated,
    /// Authenticated but not permitted (HTTP 403).
    Forbidden,
    /// Resource absent (HTTP 404).
    NotFound,
    /// Server-side failure (HTTP 500).
    Internal,
}

impl RejectionKind {
    /// Stable error code for API responses.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unauthenticated => "AUTH_UNAUTHENTICATED",
            Self::Forbidden => "AUTH_FORBIDDEN",
            Self::NotFound => "AUTH_NOT_FOUND",
            Self::Internal => "INTERNAL_ERROR",
        }
    }

    /// HTTP status code for this rejection.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::Forbidden => 403,
            Self::NotFound => 404,
            Self::Internal => 500,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for AuthError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        use jsonwebtoken::errors::ErrorKind;

        match err.kind() {
            ErrorKind::InvalidSignature => Self::SignatureInvalid,
            ErrorKind::ExpiredSignature => Self::Expired {
                expired_at: Utc::now(),
            },
            ErrorKind::InvalidRsaKey(_)
            | ErrorKind::InvalidEcdsaKey
            | ErrorKind::InvalidKeyFormat
            | ErrorKind::RsaFailedSigning => Self::Key(sanitize_message(&err.to_string())),
            _ => Self::malformed(err.to_string()),
        }
    }
}

impl From<redis::RedisError> for AuthError {
    fn from(err: redis::RedisError) -> Self {
        Self::Store(err.to_string())
    }
}

/// Replace a message wholesale if it mentions sensitive material.
fn sanitize_message(message: &str) -> String {
    let lower = message.to_lowercase();
    for pattern in SENSITIVE_PATTERNS {
        if lower.contains(pattern) {
            return "invalid token".to_string();
        }
    }
    message.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verification_failures_collapse_to_unauthenticated() {
        let errors = [
            AuthError::malformed("bad segment count"),
            AuthError::SignatureInvalid,
            AuthError::Expired {
                expired_at: Utc::now(),
            },
            AuthError::Revoked {
                jti: "jti-1".to_string(),
            },
            AuthError::Unauthenticated,
            AuthError::store("redis unreachable"),
        ];

        for err in errors {
            assert_eq!(err.rejection(), RejectionKind::Unauthenticated);
        }
    }

    #[test]
    fn forbidden_and_not_found_stay_distinct() {
        let forbidden = AuthError::Forbidden {
            resource: "board-1".to_string(),
        };
        let missing = AuthError::NotFound {
            resource: "board-1".to_string(),
        };

        assert_eq!(forbidden.rejection(), RejectionKind::Forbidden);
        assert_eq!(missing.rejection(), RejectionKind::NotFound);
        assert_ne!(forbidden.rejection(), missing.rejection());
    }

    #[test]
    fn rejection_status_codes() {
        assert_eq!(RejectionKind::Unauthenticated.status_code(), 401);
        assert_eq!(RejectionKind::Forbidden.status_code(), 403);
        assert_eq!(RejectionKind::NotFound.status_code(), 404);
        assert_eq!(RejectionKind::Internal.status_code(), 500);
    }

    #[test]
    fn malformed_reason_is_sanitized() {
        let err = AuthError::malformed("bad private key block");
        match err {
            AuthError::Malformed { reason } => assert_eq!(reason, "invalid token"),
            _ => panic!("expected Malformed"),
        }
    }
}
