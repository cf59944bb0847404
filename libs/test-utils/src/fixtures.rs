//! Test fixtures with sample data.

use auth_core::authz::ResourceAcl;
use auth_core::keys::SigningKeys;
use auth_core::token::Identity;

/// Secret used by every fixture key; HS256 keeps tests free of PEM files.
pub const TEST_SECRET: &[u8] = b"test-secret-key-for-testing-only";

/// Key id used by fixture keys.
pub const TEST_KEY_ID: &str = "test-key";

/// Signing keys every fixture token is minted with.
#[must_use]
pub fn signing_keys() -> SigningKeys {
    SigningKeys::from_secret(TEST_KEY_ID, TEST_SECRET)
}

/// The owner of [`board`].
#[must_use]
pub fn alice() -> Identity {
    Identity {
        user_id: "user-alice".to_string(),
        user_type: "member".to_string(),
        user_status: "active".to_string(),
        first_name: "Alice".to_string(),
        last_name: "Archer".to_string(),
        email: "alice@example.com".to_string(),
        phone_number: Some("+15550100".to_string()),
    }
}

/// A collaborator on [`board`].
#[must_use]
pub fn bob() -> Identity {
    Identity {
        user_id: "user-bob".to_string(),
        user_type: "member".to_string(),
        user_status: "active".to_string(),
        first_name: "Bob".to_string(),
        last_name: "Builder".to_string(),
        email: "bob@example.com".to_string(),
        phone_number: None,
    }
}

/// Neither owner nor collaborator of anything.
#[must_use]
pub fn mallory() -> Identity {
    Identity {
        user_id: "user-mallory".to_string(),
        user_type: "member".to_string(),
        user_status: "active".to_string(),
        first_name: "Mallory".to_string(),
        last_name: "Mallet".to_string(),
        email: "mallory@example.com".to_string(),
        phone_number: None,
    }
}

/// A board owned by alice with bob as collaborator.
#[must_use]
pub fn board() -> ResourceAcl {
    ResourceAcl {
        resource_id: "board-1".to_string(),
        board_id: "board-1".to_string(),
        owner_id: "user-alice".to_string(),
        collaborator_ids: vec!["user-bob".to_string()],
    }
}

/// A table under [`board`].
#[must_use]
pub fn table() -> ResourceAcl {
    ResourceAcl {
        resource_id: "table-1".to_string(),
        board_id: "board-1".to_string(),
        owner_id: "user-alice".to_string(),
        collaborator_ids: vec!["user-bob".to_string()],
    }
}

/// A task under [`table`].
#[must_use]
pub fn task() -> ResourceAcl {
    ResourceAcl {
        resource_id: "task-1".to_string(),
        board_id: "board-1".to_string(),
        owner_id: "user-alice".to_string(),
        collaborator_ids: vec!["user-bob".to_string()],
    }
}

/// The whole board -> table -> task hierarchy.
#[must_use]
pub fn hierarchy() -> Vec<ResourceAcl> {
    vec![board(), table(), task()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hierarchy_shares_one_board() {
        for acl in hierarchy() {
            assert_eq!(acl.board_id, "board-1");
            assert_eq!(acl.owner_id, alice().user_id);
        }
    }

    #[test]
    fn mallory_is_a_stranger() {
        let board = board();
        let mallory = mallory();
        assert_ne!(board.owner_id, mallory.user_id);
        assert!(!board.collaborator_ids.contains(&mallory.user_id));
    }
}
