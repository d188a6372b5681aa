//! Composition of the slice reducers.

use std::sync::Arc;

use crate::action::Action;
use crate::reducers;
use crate::snapshot::Snapshot;

/// Feed `action` to every slice reducer.
///
/// Returns `prev` itself when no slice changed, so callers can skip
/// publication and persistence with a pointer comparison.
pub fn reduce(prev: &Arc<Snapshot>, action: &Action) -> Arc<Snapshot> {
    let next = Snapshot {
        accounts: reducers::accounts::reduce(&prev.accounts, action),
        session: reducers::session::reduce(&prev.session, action),
        settings: reducers::settings::reduce(&prev.settings, action),
        realm: reducers::realm::reduce(&prev.realm, action),
        users: reducers::users::reduce(&prev.users, action),
        streams: reducers::streams::reduce(&prev.streams, action),
        subscriptions: reducers::subscriptions::reduce(&prev.subscriptions, action),
        topics: reducers::topics::reduce(&prev.topics, action),
        messages: reducers::messages::reduce(&prev.messages, action),
        fetching: reducers::fetching::reduce(&prev.fetching, action),
        outbox: reducers::outbox::reduce(&prev.outbox, action),
        drafts: reducers::drafts::reduce(&prev.drafts, action),
        presence: reducers::presence::reduce(&prev.presence, action),
        typing: reducers::typing::reduce(&prev.typing, action),
        user_groups: reducers::user_groups::reduce(&prev.user_groups, action),
        mute: reducers::mute::reduce(&prev.mute, action),
    };
    if next.shares_all_slices(prev) {
        Arc::clone(prev)
    } else {
        Arc::new(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_shared::models::{Account, MutedTopic};
    use tidings_shared::narrow::Narrow;
    use tidings_shared::types::{GroupId, LocalMessageId, MessageId, StreamId, UserId};

    use crate::reducers::session::SessionState;
    use crate::reducers::settings::SettingsState;
    use crate::testing::{
        eid, group, outbox, stream, stream_message, subscription, user, OWN_USER,
    };

    fn populated() -> Arc<Snapshot> {
        let account = Account {
            email: "me@example.com".into(),
            api_key: "key".into(),
            ..Account::new("https://chat.example.com")
        };
        Arc::new(Snapshot {
            accounts: Arc::new(vec![account, Account::new("https://other.example.org")]),
            settings: Arc::new(SettingsState {
                theme: "night".into(),
                ..SettingsState::default()
            }),
            users: Arc::new([(UserId(1), user(1, "Me"))].into()),
            streams: Arc::new([(StreamId(10), stream(10, "general"))].into()),
            subscriptions: Arc::new([(StreamId(10), subscription(10, "general"))].into()),
            messages: Arc::new([(MessageId(5), stream_message(5, "general", "lunch"))].into()),
            outbox: Arc::new(vec![outbox(1, "general", "lunch")]),
            user_groups: Arc::new(vec![group(1, "admins", &[1])]),
            mute: Arc::new(vec![MutedTopic {
                stream: "general".into(),
                topic: "lunch".into(),
            }]),
            ..Snapshot::default()
        })
    }

    #[test]
    fn test_unmatched_action_returns_same_snapshot() {
        // The queue has already seen event 42, so no slice has anything to do.
        let prev = Arc::new(Snapshot {
            session: Arc::new(SessionState {
                last_event_id: eid().0,
                ..SessionState::default()
            }),
            ..(*populated()).clone()
        });
        for action in [
            Action::CancelEditMessage,
            Action::EventUserGroupAddMembers {
                id: eid(),
                group_id: GroupId(99),
                user_ids: vec![UserId(1)],
            },
            Action::ClearTyping { outdated: vec![] },
        ] {
            let next = reduce(&prev, &action);
            assert!(Arc::ptr_eq(&prev, &next), "{}", action.name());
        }
    }

    #[test]
    fn test_event_for_absent_group_only_advances_event_id() {
        let prev = populated();
        let next = reduce(
            &prev,
            &Action::EventUserGroupAddMembers {
                id: eid(),
                group_id: GroupId(99),
                user_ids: vec![UserId(1)],
            },
        );
        assert_eq!(next.session.last_event_id, eid().0);
        assert!(Arc::ptr_eq(&prev.user_groups, &next.user_groups));
        let untouched = Snapshot {
            session: Arc::clone(&prev.session),
            ..(*next).clone()
        };
        assert!(untouched.shares_all_slices(&prev));
    }

    #[test]
    fn test_only_touched_slice_is_rebuilt() {
        let prev = populated();
        let next = reduce(
            &prev,
            &Action::DraftUpdate {
                narrow: Narrow::topic("general", "lunch"),
                content: "hello".into(),
            },
        );
        assert!(!Arc::ptr_eq(&prev, &next));
        assert!(!Arc::ptr_eq(&prev.drafts, &next.drafts));
        assert!(Arc::ptr_eq(&prev.messages, &next.messages));
        assert!(Arc::ptr_eq(&prev.accounts, &next.accounts));
    }

    #[test]
    fn test_account_switch_resets_per_account_slices() {
        let prev = populated();
        for action in [Action::AccountSwitch { index: 1 }, Action::Logout] {
            let next = reduce(&prev, &action);
            let initial = Snapshot::default();
            assert_eq!(next.realm, initial.realm);
            assert_eq!(next.users, initial.users);
            assert_eq!(next.streams, initial.streams);
            assert_eq!(next.subscriptions, initial.subscriptions);
            assert_eq!(next.topics, initial.topics);
            assert_eq!(next.messages, initial.messages);
            assert_eq!(next.fetching, initial.fetching);
            assert_eq!(next.outbox, initial.outbox);
            assert_eq!(next.drafts, initial.drafts);
            assert_eq!(next.presence, initial.presence);
            assert_eq!(next.typing, initial.typing);
            assert_eq!(next.user_groups, initial.user_groups);
            assert_eq!(next.mute, initial.mute);

            assert_eq!(next.accounts.len(), 2);
            assert_eq!(next.settings.theme, "night");
        }
    }

    #[test]
    fn test_echo_reconciles_outbox_and_messages() {
        let prev = populated();
        let next = reduce(
            &prev,
            &Action::EventNewMessage {
                id: eid(),
                message: Box::new(stream_message(6, "general", "lunch")),
                local_message_id: Some(LocalMessageId(1)),
                own_user_id: OWN_USER,
            },
        );
        assert!(next.outbox.is_empty());
        assert!(next.messages.contains_key(&MessageId(6)));
        assert_eq!(next.session.last_event_id, eid().0);
    }
}
