//! Property-based tests for the token codec and verifier.
//!
//! Property 1: encode/decode round-trip returns the identity's claims plus
//! generated `jti`/`iat`/`exp`.
//! Property 2: expired tokens always fail verification with `Expired`,
//! regardless of signature validity.

use proptest::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use auth_core::error::AuthError;
use auth_core::revocation::InMemoryRevocationStore;
use auth_core::token::codec::TokenCodec;
use auth_core::token::{Claims, TokenUse, TokenVerifier};
use test_utils::{fixtures, generators};

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property 1: decode(encode(identity)) preserves every identity claim
    /// and adds freshly generated `jti`, `iat`, `exp`.
    #[test]
    fn prop_round_trip_is_a_superset(
        identity in generators::identity_strategy(),
        ttl in generators::ttl_strategy(),
    ) {
        let keys = fixtures::signing_keys();
        let codec = TokenCodec;

        let (token, claims) = codec.encode_access(&identity, &keys, ttl).unwrap();
        let decoded = codec.decode(&token, &keys.verifying()).unwrap();

        prop_assert_eq!(&decoded.sub, &identity.user_id);
        prop_assert_eq!(decoded.user_type.as_deref(), Some(identity.user_type.as_str()));
        prop_assert_eq!(decoded.user_status.as_deref(), Some(identity.user_status.as_str()));
        prop_assert_eq!(decoded.first_name.as_deref(), Some(identity.first_name.as_str()));
        prop_assert_eq!(decoded.last_name.as_deref(), Some(identity.last_name.as_str()));
        prop_assert_eq!(decoded.email.as_deref(), Some(identity.email.as_str()));
        prop_assert_eq!(&decoded.phone_number, &identity.phone_number);

        prop_assert!(!decoded.jti.is_empty());
        prop_assert_eq!(&decoded.jti, &claims.jti);
        prop_assert_eq!(decoded.exp - decoded.iat, ttl.as_secs() as i64);
    }

    /// Wire structure: three base64url segments, Bearer header, and the
    /// claims segment carrying exactly the expected fields.
    #[test]
    fn prop_wire_structure(
        identity in generators::identity_strategy(),
        ttl in generators::ttl_strategy(),
    ) {
        let keys = fixtures::signing_keys();
        let (token, _) = TokenCodec.encode_access(&identity, &keys, ttl).unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        prop_assert_eq!(segments.len(), 3);

        let payload = base64::Engine::decode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            segments[1],
        ).unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&payload).unwrap();

        prop_assert!(payload.get("sub").is_some());
        prop_assert!(payload.get("iat").is_some());
        prop_assert!(payload.get("exp").is_some());
        prop_assert!(payload.get("jti").is_some());
        prop_assert_eq!(&payload["token_use"], "access");

        let exp = payload["exp"].as_i64().unwrap();
        let iat = payload["iat"].as_i64().unwrap();
        prop_assert!(exp > iat);
    }

    /// Refresh tokens never leak profile fields onto the wire.
    #[test]
    fn prop_refresh_claims_are_minimal(
        identity in generators::identity_strategy(),
        ttl in generators::ttl_strategy(),
    ) {
        let keys = fixtures::signing_keys();
        let (token, _) = TokenCodec
            .encode_refresh(&identity.user_id, &keys, ttl)
            .unwrap();

        let segments: Vec<&str> = token.split('.').collect();
        let payload = base64::Engine::decode(
            &base64::engine::general_purpose::URL_SAFE_NO_PAD,
            segments[1],
        ).unwrap();
        let payload: serde_json::Value = serde_json::from_slice(&payload).unwrap();
        let object = payload.as_object().unwrap();

        prop_assert!(!object.contains_key("email"));
        prop_assert!(!object.contains_key("first_name"));
        prop_assert!(!object.contains_key("last_name"));
        prop_assert!(!object.contains_key("phone_number"));
        prop_assert_eq!(&payload["token_use"], "refresh");
    }

    /// Property 2: a past `exp` always fails `Expired`, even with a valid
    /// signature.
    #[test]
    fn prop_expired_always_fails(
        identity in generators::identity_strategy(),
        age in 1i64..1_000_000,
    ) {
        let keys = fixtures::signing_keys();
        let now = chrono::Utc::now().timestamp();

        let claims = Claims {
            sub: identity.user_id.clone(),
            user_type: Some(identity.user_type.clone()),
            user_status: Some(identity.user_status.clone()),
            first_name: Some(identity.first_name.clone()),
            last_name: Some(identity.last_name.clone()),
            email: Some(identity.email.clone()),
            phone_number: identity.phone_number.clone(),
            iat: now - age - 60,
            exp: now - age,
            jti: format!("jti-{age}"),
            token_use: TokenUse::Access,
        };

        let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::HS256);
        header.typ = Some("Bearer".to_string());
        let token = jsonwebtoken::encode(
            &header,
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(fixtures::TEST_SECRET),
        ).unwrap();

        let verifier = TokenVerifier::new(
            keys.verifying(),
            Arc::new(InMemoryRevocationStore::new()),
        );
        let result = tokio_test::block_on(verifier.verify(&token));

        prop_assert!(matches!(result, Err(AuthError::Expired { .. })), "expected an Expired error");
    }

    /// `jti` uniqueness across repeated encodes of the same identity.
    #[test]
    fn prop_jti_uniqueness(identity in generators::identity_strategy()) {
        let keys = fixtures::signing_keys();
        let mut jtis = std::collections::HashSet::new();

        for _ in 0..10 {
            let (_, claims) = TokenCodec
                .encode_access(&identity, &keys, Duration::from_secs(900))
                .unwrap();
            prop_assert!(jtis.insert(claims.jti.clone()), "duplicate jti: {}", claims.jti);
        }
    }
}
