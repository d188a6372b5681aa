use tidings_shared::models::{Account, Identity};
use tidings_shared::types::UserId;

use crate::snapshot::Snapshot;

/// The account currently in use, if any login was ever started.
pub fn active_account(snapshot: &Snapshot) -> Option<&Account> {
    snapshot.accounts.first()
}

/// Known once the server has answered the register request.
pub fn own_user_id(snapshot: &Snapshot) -> Option<UserId> {
    active_account(snapshot).and_then(|a| a.user_id)
}

pub fn has_auth(snapshot: &Snapshot) -> bool {
    active_account(snapshot).is_some_and(Account::has_auth)
}

pub fn identity(snapshot: &Snapshot) -> Option<Identity> {
    active_account(snapshot).map(Account::identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_empty_registry() {
        let snapshot = Snapshot::default();
        assert!(active_account(&snapshot).is_none());
        assert!(!has_auth(&snapshot));
        assert_eq!(own_user_id(&snapshot), None);
    }

    #[test]
    fn test_active_account() {
        let snapshot = Snapshot {
            accounts: Arc::new(vec![Account {
                email: "me@example.com".into(),
                api_key: "key".into(),
                user_id: Some(UserId(1)),
                ..Account::new("https://chat.example.com")
            }]),
            ..Snapshot::default()
        };
        assert!(has_auth(&snapshot));
        assert_eq!(own_user_id(&snapshot), Some(UserId(1)));
        assert_eq!(
            identity(&snapshot),
            Some(Identity {
                realm: "https://chat.example.com".into(),
                email: "me@example.com".into(),
            })
        );
    }
}
