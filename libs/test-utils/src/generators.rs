//! Shared proptest generators for domain types.

use auth_core::token::Identity;
use proptest::prelude::*;
use std::time::Duration;

/// Generate user ids.
pub fn user_id_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9]{8,32}".prop_map(|id| format!("user-{id}"))
}

/// Generate resource ids for one hierarchy level.
pub fn resource_id_strategy(kind: &'static str) -> impl Strategy<Value = String> {
    "[a-z0-9]{8,16}".prop_map(move |id| format!("{kind}-{id}"))
}

/// Generate email addresses.
pub fn email_strategy() -> impl Strategy<Value = String> {
    ("[a-z0-9._%+-]{1,16}", "[a-z0-9-]{1,12}", "[a-z]{2,4}")
        .prop_map(|(local, domain, tld)| format!("{local}@{domain}.{tld}"))
}

/// Generate person names.
pub fn name_strategy() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{1,15}"
}

/// Generate account types as the platform uses them.
pub fn user_type_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("member".to_string()), Just("admin".to_string())]
}

/// Generate account statuses.
pub fn user_status_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("active".to_string()),
        Just("pending".to_string()),
        Just("blocked".to_string()),
    ]
}

/// Generate phone numbers, sometimes absent.
pub fn phone_strategy() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[0-9]{7,12}".prop_map(|digits| format!("+1{digits}")))
}

/// Generate complete identities.
pub fn identity_strategy() -> impl Strategy<Value = Identity> {
    (
        user_id_strategy(),
        user_type_strategy(),
        user_status_strategy(),
        name_strategy(),
        name_strategy(),
        email_strategy(),
        phone_strategy(),
    )
        .prop_map(
            |(user_id, user_type, user_status, first_name, last_name, email, phone_number)| {
                Identity {
                    user_id,
                    user_type,
                    user_status,
                    first_name,
                    last_name,
                    email,
                    phone_number,
                }
            },
        )
}

/// Generate token TTLs (1 minute to 24 hours).
pub fn ttl_strategy() -> impl Strategy<Value = Duration> {
    (60u64..86400).prop_map(Duration::from_secs)
}

/// Generate token id sets with possible duplicates, for idempotency tests.
pub fn jti_batch_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-f0-9]{8}", 1..20)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::strategy::ValueTree;
    use proptest::test_runner::TestRunner;

    #[test]
    fn test_user_id_format() {
        let mut runner = TestRunner::default();
        for _ in 0..10 {
            let value = user_id_strategy().new_tree(&mut runner).unwrap().current();
            assert!(value.starts_with("user-"));
        }
    }

    #[test]
    fn test_email_has_one_at_sign() {
        let mut runner = TestRunner::default();
        for _ in 0..10 {
            let value = email_strategy().new_tree(&mut runner).unwrap().current();
            assert_eq!(value.matches('@').count(), 1);
        }
    }

    #[test]
    fn test_ttl_range() {
        let mut runner = TestRunner::default();
        for _ in 0..10 {
            let value = ttl_strategy().new_tree(&mut runner).unwrap().current();
            assert!(value.as_secs() >= 60);
            assert!(value.as_secs() < 86400);
        }
    }
}
