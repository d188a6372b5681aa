//! Who is typing in which private conversation. Never persisted.

use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_shared::types::{normalize_user_ids, ConversationKey, UserId};

use super::{initial, modify};
use crate::action::Action;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypingEntry {
    /// Sorted.
    pub user_ids: Vec<UserId>,
    /// Unix seconds of the latest start notification.
    pub time: i64,
}

pub type TypingState = BTreeMap<ConversationKey, TypingEntry>;

/// The conversation a typing notification belongs to, as seen by the own user.
pub fn typing_key(sender_id: UserId, recipient_ids: &[UserId], own_user_id: UserId) -> ConversationKey {
    let others: Vec<UserId> = normalize_user_ids(
        recipient_ids
            .iter()
            .copied()
            .chain(std::iter::once(sender_id)),
    )
    .into_iter()
    .filter(|id| *id != own_user_id)
    .collect();
    if others.is_empty() {
        ConversationKey::private([own_user_id])
    } else {
        ConversationKey::private(others)
    }
}

pub fn reduce(state: &Arc<TypingState>, action: &Action) -> Arc<TypingState> {
    match action {
        a if a.resets_account_data() => initial(state),

        Action::EventTypingStart {
            sender_id,
            recipient_ids,
            own_user_id,
            time,
            ..
        } => {
            if sender_id == own_user_id {
                return Arc::clone(state);
            }
            let key = typing_key(*sender_id, recipient_ids, *own_user_id);
            modify(state, |map| {
                let entry = map.entry(key).or_insert_with(|| TypingEntry {
                    user_ids: Vec::new(),
                    time: *time,
                });
                let mut changed = false;
                if let Err(pos) = entry.user_ids.binary_search(sender_id) {
                    entry.user_ids.insert(pos, *sender_id);
                    changed = true;
                }
                if entry.time != *time {
                    entry.time = *time;
                    changed = true;
                }
                changed
            })
        }

        Action::EventTypingStop {
            sender_id,
            recipient_ids,
            own_user_id,
            ..
        } => {
            let key = typing_key(*sender_id, recipient_ids, *own_user_id);
            let typing = state
                .get(&key)
                .is_some_and(|entry| entry.user_ids.contains(sender_id));
            if !typing {
                return Arc::clone(state);
            }
            modify(state, |map| {
                let Some(entry) = map.get_mut(&key) else {
                    return false;
                };
                entry.user_ids.retain(|id| id != sender_id);
                if entry.user_ids.is_empty() {
                    map.remove(&key);
                }
                true
            })
        }

        Action::ClearTyping { outdated } => modify(state, |map| {
            let mut changed = false;
            for key in outdated {
                changed |= map.remove(key).is_some();
            }
            changed
        }),

        _ => Arc::clone(state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_shared::types::EventId;

    use crate::testing::OWN_USER;

    fn start(sender: u64, recipients: &[u64], time: i64) -> Action {
        Action::EventTypingStart {
            id: EventId(1),
            sender_id: UserId(sender),
            recipient_ids: recipients.iter().copied().map(UserId).collect(),
            own_user_id: OWN_USER,
            time,
        }
    }

    fn stop(sender: u64, recipients: &[u64]) -> Action {
        Action::EventTypingStop {
            id: EventId(2),
            sender_id: UserId(sender),
            recipient_ids: recipients.iter().copied().map(UserId).collect(),
            own_user_id: OWN_USER,
        }
    }

    #[test]
    fn test_group_typing_shares_one_key() {
        let state = Arc::new(TypingState::new());
        let one = reduce(&state, &start(3, &[1, 3, 4], 100));
        let two = reduce(&one, &start(4, &[1, 3, 4], 101));
        let key = ConversationKey::private([UserId(3), UserId(4)]);
        assert_eq!(two.len(), 1);
        assert_eq!(two[&key].user_ids, vec![UserId(3), UserId(4)]);
        assert_eq!(two[&key].time, 101);

        let stopped = reduce(&two, &stop(3, &[1, 3, 4]));
        assert_eq!(stopped[&key].user_ids, vec![UserId(4)]);
        let empty = reduce(&stopped, &stop(4, &[1, 3, 4]));
        assert!(empty.is_empty());
    }

    #[test]
    fn test_own_typing_is_ignored() {
        let state = Arc::new(TypingState::new());
        assert!(Arc::ptr_eq(&state, &reduce(&state, &start(1, &[1, 2], 5))));
        assert!(Arc::ptr_eq(&state, &reduce(&state, &stop(2, &[1, 2]))));
    }

    #[test]
    fn test_clear_outdated() {
        let state = reduce(&Arc::new(TypingState::new()), &start(2, &[1], 10));
        let key = typing_key(UserId(2), &[UserId(1)], OWN_USER);
        let cleared = reduce(&state, &Action::ClearTyping { outdated: vec![key] });
        assert!(cleared.is_empty());
    }
}
