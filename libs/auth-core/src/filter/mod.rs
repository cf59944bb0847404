//! Request authentication, shared by every service's pipeline.
//!
//! The same authenticator runs at the HTTP edge, inside each downstream
//! service, and at the WebSocket handshake; only the token's carrier
//! differs (`Authorization` header vs `?token=` query parameter, since
//! browsers cannot set headers on an upgrade request).

pub mod extract;
pub mod layer;

use std::sync::Arc;

use tracing::warn;

use crate::error::AuthError;
use crate::token::claims::TokenUse;
use crate::token::verifier::{TokenVerifier, VerifiedClaims};

pub use extract::{bearer_token, upgrade_token};
pub use layer::{AuthLayer, AuthService};

/// Whether an endpoint tolerates anonymous callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRequirement {
    /// Reject requests without a valid access token.
    Required,
    /// Continue unauthenticated when no token is presented; a presented
    /// token must still verify.
    Optional,
}

/// Extracts the bearer token and resolves it to a request principal.
pub struct RequestAuthenticator {
    verifier: Arc<TokenVerifier>,
}

impl RequestAuthenticator {
    /// Create an authenticator over the service's verifier.
    #[must_use]
    pub fn new(verifier: Arc<TokenVerifier>) -> Self {
        Self { verifier }
    }

    /// Authenticate from an `Authorization` header value.
    ///
    /// # Errors
    ///
    /// `Unauthenticated` when a required token is absent; any verifier
    /// failure when a presented token does not check out. Callers translate
    /// the error to their transport (401, handshake refusal) via
    /// [`AuthError::rejection`]; it must never reach business logic.
    pub async fn authenticate_header(
        &self,
        authorization: Option<&str>,
        requirement: AuthRequirement,
    ) -> Result<Option<VerifiedClaims>, AuthError> {
        let token = authorization.and_then(bearer_token);
        self.authenticate_token(token, requirement).await
    }

    /// Authenticate a WebSocket upgrade request from its URI.
    ///
    /// # Errors
    ///
    /// As [`authenticate_header`](Self::authenticate_header); an error
    /// means the handshake must be refused.
    pub async fn authenticate_upgrade(
        &self,
        uri: &http::Uri,
        requirement: AuthRequirement,
    ) -> Result<Option<VerifiedClaims>, AuthError> {
        let token = upgrade_token(uri.query());
        self.authenticate_token(token.as_deref(), requirement).await
    }

    async fn authenticate_token(
        &self,
        token: Option<&str>,
        requirement: AuthRequirement,
    ) -> Result<Option<VerifiedClaims>, AuthError> {
        match token {
            None => match requirement {
                AuthRequirement::Optional => Ok(None),
                AuthRequirement::Required => Err(AuthError::Unauthenticated),
            },
            Some(raw) => {
                let principal = self
                    .verifier
                    .verify_expecting(raw, TokenUse::Access)
                    .await
                    .map_err(|err| {
                        warn!(error = %err, "request authentication failed");
                        err
                    })?;
                Ok(Some(principal))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::SigningKeys;
    use crate::revocation::InMemoryRevocationStore;
    use crate::token::claims::Identity;
    use crate::token::codec::TokenCodec;
    use std::time::Duration;

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

    fn setup() -> (SigningKeys, RequestAuthenticator) {
        let keys = SigningKeys::from_secret("test-key", b"test-secret-key-for-testing-only");
        let verifier = Arc::new(TokenVerifier::new(
            keys.verifying(),
            Arc::new(InMemoryRevocationStore::new()),
        ));
        (keys, RequestAuthenticator::new(verifier))
    }

    #[tokio::test]
    async fn valid_bearer_header_yields_a_principal() {
        let (keys, authenticator) = setup();
        let (token, _) = TokenCodec
            .encode_access(&identity(), &keys, Duration::from_secs(900))
            .unwrap();
        let header = format!("Bearer {token}");

        let principal = authenticator
            .authenticate_header(Some(&header), AuthRequirement::Required)
            .await
            .unwrap();
        assert_eq!(principal.unwrap().subject(), "user-123");
    }

    #[tokio::test]
    async fn missing_token_on_required_endpoint_is_unauthenticated() {
        let (_, authenticator) = setup();

        let result = authenticator
            .authenticate_header(None, AuthRequirement::Required)
            .await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }

    #[tokio::test]
    async fn missing_token_on_optional_endpoint_is_anonymous() {
        let (_, authenticator) = setup();

        let principal = authenticator
            .authenticate_header(None, AuthRequirement::Optional)
            .await
            .unwrap();
        assert!(principal.is_none());
    }

    #[tokio::test]
    async fn invalid_token_fails_even_on_optional_endpoints() {
        let (_, authenticator) = setup();

        let result = authenticator
            .authenticate_header(Some("Bearer garbage"), AuthRequirement::Optional)
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn refresh_token_is_not_an_access_credential() {
        let (keys, authenticator) = setup();
        let (refresh, _) = TokenCodec
            .encode_refresh("user-123", &keys, Duration::from_secs(3600))
            .unwrap();
        let header = format!("Bearer {refresh}");

        let result = authenticator
            .authenticate_header(Some(&header), AuthRequirement::Required)
            .await;
        assert!(matches!(result, Err(AuthError::WrongTokenUse { .. })));
    }

    #[tokio::test]
    async fn upgrade_token_is_read_from_the_query() {
        let (keys, authenticator) = setup();
        let (token, _) = TokenCodec
            .encode_access(&identity(), &keys, Duration::from_secs(900))
            .unwrap();
        let uri: http::Uri = format!("/ws/notifications?token={token}")
            .parse()
            .unwrap();

        let principal = authenticator
            .authenticate_upgrade(&uri, AuthRequirement::Required)
            .await
            .unwrap();
        assert_eq!(principal.unwrap().subject(), "user-123");
    }

    #[tokio::test]
    async fn upgrade_without_token_is_refused() {
        let (_, authenticator) = setup();
        let uri: http::Uri = "/ws/notifications".parse().unwrap();

        let result = authenticator
            .authenticate_upgrade(&uri, AuthRequirement::Required)
            .await;
        assert!(matches!(result, Err(AuthError::Unauthenticated)));
    }
}
