use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_shared::models::User;
use tidings_shared::types::UserId;

use super::{initial, modify, replace, set};
use crate::action::Action;

pub type UsersState = BTreeMap<UserId, User>;

pub fn reduce(state: &Arc<UsersState>, action: &Action) -> Arc<UsersState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.users),
        a if a.resets_account_data() => initial(state),

        Action::RegisterComplete(data) => replace(
            state,
            data.realm_users
                .iter()
                .map(|u| (u.user_id, u.clone()))
                .collect(),
        ),

        Action::EventUserAdd { person, .. } => modify(state, |users| {
            if users.get(&person.user_id) == Some(person) {
                return false;
            }
            users.insert(person.user_id, person.clone());
            true
        }),

        Action::EventUserRemove { user_id, .. } => {
            if !state.contains_key(user_id) {
                return Arc::clone(state);
            }
            modify(state, |users| users.remove(user_id).is_some())
        }

        Action::EventUserUpdate {
            user_id,
            full_name,
            email,
            avatar_url,
            timezone,
            ..
        } => {
            if !state.contains_key(user_id) {
                return Arc::clone(state);
            }
            modify(state, |users| {
                let Some(user) = users.get_mut(user_id) else {
                    return false;
                };
                let mut changed = false;
                if let Some(full_name) = full_name {
                    changed |= set(&mut user.full_name, full_name.clone());
                }
                if let Some(email) = email {
                    changed |= set(&mut user.email, email.clone());
                }
                if let Some(avatar_url) = avatar_url {
                    changed |= set(&mut user.avatar_url, Some(avatar_url.clone()));
                }
                if let Some(timezone) = timezone {
                    changed |= set(&mut user.timezone, timezone.clone());
                }
                changed
            })
        }

        _ => Arc::clone(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{eid, user};

    fn state() -> Arc<UsersState> {
        Arc::new(
            [user(1, "Me"), user(2, "Iago")]
                .into_iter()
                .map(|u| (u.user_id, u))
                .collect(),
        )
    }

    #[test]
    fn test_user_update() {
        let state = state();
        let next = reduce(
            &state,
            &Action::EventUserUpdate {
                id: eid(),
                user_id: UserId(2),
                full_name: Some("Iago M.".into()),
                email: None,
                avatar_url: None,
                timezone: Some("Europe/Madrid".into()),
            },
        );
        assert_eq!(next[&UserId(2)].full_name, "Iago M.");
        assert_eq!(next[&UserId(2)].email, "iago@example.com");
        assert_eq!(next[&UserId(2)].timezone, "Europe/Madrid");

        let absent = Action::EventUserUpdate {
            id: eid(),
            user_id: UserId(50),
            full_name: Some("Nobody".into()),
            email: None,
            avatar_url: None,
            timezone: None,
        };
        assert!(Arc::ptr_eq(&state, &reduce(&state, &absent)));
    }

    #[test]
    fn test_user_add_and_remove() {
        let state = state();
        let added = reduce(
            &state,
            &Action::EventUserAdd {
                id: eid(),
                person: user(3, "Cordelia"),
            },
        );
        assert_eq!(added.len(), 3);
        let removed = reduce(
            &added,
            &Action::EventUserRemove {
                id: eid(),
                user_id: UserId(3),
            },
        );
        assert_eq!(*removed, *state);
    }
}
