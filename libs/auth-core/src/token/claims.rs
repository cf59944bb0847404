//! Claim types carried inside signed tokens.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Whether a token grants resource access or only mints new pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenUse {
    /// Short-lived credential sent with every request.
    Access,
    /// Long-lived credential used solely to mint new access tokens.
    Refresh,
}

impl TokenUse {
    /// Claim value as serialized on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Identity attributes the issuing service binds into an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Unique user id (the token subject)
    pub user_id: String,
    /// Account type, e.g. "member" or "admin"
    pub user_type: String,
    /// Account status, e.g. "active" or "blocked"
    pub user_status: String,
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Email address
    pub email: String,
    /// Phone number, if the user provided one
    pub phone_number: Option<String>,
}

/// The signed payload of a token.
///
/// Access tokens carry the full identity; refresh tokens carry only `sub`,
/// timestamps, `jti`, and the use marker. The profile fields stay absent
/// and are omitted from the wire entirely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Claims {
    /// Subject user id
    pub sub: String,
    /// Account type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_type: Option<String>,
    /// Account status
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_status: Option<String>,
    /// Given name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Email address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Phone number
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    /// Issued-at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
    /// Unique token id; the sole identifier consulted for revocation
    pub jti: String,
    /// Use class of this token
    pub token_use: TokenUse,
}

impl Claims {
    /// Full claims for a new access token. Stamps `iat`/`exp` from the
    /// current clock and generates a fresh `jti`; callers never supply one.
    pub(crate) fn access(identity: &Identity, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        Claims {
            sub: identity.user_id.clone(),
            user_type: Some(identity.user_type.clone()),
            user_status: Some(identity.user_status.clone()),
            first_name: Some(identity.first_name.clone()),
            last_name: Some(identity.last_name.clone()),
            email: Some(identity.email.clone()),
            phone_number: identity.phone_number.clone(),
            iat: now,
            exp: now + ttl.as_secs() as i64,
            jti: uuid::Uuid::new_v4().to_string(),
            token_use: TokenUse::Access,
        }
    }

    /// Minimal claims for a new refresh token: subject and token id only.
    pub(crate) fn refresh(subject: &str, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        Claims {
            sub: subject.to_string(),
            user_type: None,
            user_status: None,
            first_name: None,
            last_name: None,
            email: None,
            phone_number: None,
            iat: now,
            exp: now + ttl.as_secs() as i64,
            jti: uuid::Uuid::new_v4().to_string(),
            token_use: TokenUse::Refresh,
        }
    }

    /// Whether `exp` is in the past.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.exp < Utc::now().timestamp()
    }

    /// Expiry as a UTC timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_else(Utc::now)
    }

    /// Issued-at as a UTC timestamp.
    #[must_use]
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_else(Utc::now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            user_id: "user-123".to_string(),
            user_type: "member".to_string(),
            user_status: "active".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone_number: None,
        }
    }

    #[test]
    fn access_claims_carry_full_identity() {
        let claims = Claims::access(&identity(), Duration::from_secs(900));

        assert_eq!(claims.sub, "user-123");
        assert_eq!(claims.email.as_deref(), Some("ada@example.com"));
        assert_eq!(claims.token_use, TokenUse::Access);
        assert!(!claims.is_expired());
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn refresh_claims_are_minimal_on_the_wire() {
        let claims = Claims::refresh("user-123", Duration::from_secs(604_800));
        let json = serde_json::to_value(&claims).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(claims.token_use, TokenUse::Refresh);
        assert!(!object.contains_key("email"));
        assert!(!object.contains_key("first_name"));
        assert!(object.contains_key("sub"));
        assert!(object.contains_key("jti"));
    }

    #[test]
    fn jti_is_fresh_per_stamping() {
        let a = Claims::access(&identity(), Duration::from_secs(900));
        let b = Claims::access(&identity(), Duration::from_secs(900));
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn expired_claims_detected() {
        let mut claims = Claims::refresh("user-123", Duration::from_secs(60));
        claims.exp = Utc::now().timestamp() - 10;
        assert!(claims.is_expired());
    }
}
