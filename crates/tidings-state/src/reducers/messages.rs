//! Messages, keyed by server id.
//!
//! A message seen twice (fetched and then delivered as an event, or fetched
//! by two overlapping narrows) replaces its earlier copy; the map never holds
//! duplicates. Outbox entries live in their own slice and never land here.

use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_shared::constants::FLAG_READ;
use tidings_shared::models::{Destination, Message};
use tidings_shared::types::MessageId;

use super::{initial, modify};
use crate::action::{Action, FlagOperation};

pub type MessagesState = BTreeMap<MessageId, Message>;

pub fn reduce(state: &Arc<MessagesState>, action: &Action) -> Arc<MessagesState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.messages),
        a if a.resets_account_data() => initial(state),
        Action::RegisterComplete(_) => initial(state),

        Action::MessageFetchComplete { messages, .. } => modify(state, |map| {
            let mut changed = false;
            for message in messages {
                changed |= upsert(map, message);
            }
            changed
        }),

        Action::EventNewMessage { message, .. } => modify(state, |map| upsert(map, message)),

        Action::EventMessageDelete { message_ids, .. } => modify(state, |map| {
            let mut changed = false;
            for id in message_ids {
                changed |= map.remove(id).is_some();
            }
            changed
        }),

        Action::EventUpdateMessage {
            message_id,
            content,
            topic,
            edit_timestamp,
            ..
        } => {
            if !state.contains_key(message_id) {
                return Arc::clone(state);
            }
            modify(state, |map| {
                let Some(message) = map.get_mut(message_id) else {
                    return false;
                };
                let mut changed = false;
                if let Some(content) = content.as_ref().filter(|c| **c != message.content) {
                    message.content = content.clone();
                    changed = true;
                }
                if let (Some(new_topic), Destination::Stream { topic, .. }) =
                    (topic, &mut message.destination)
                {
                    if *new_topic != *topic {
                        *topic = new_topic.clone();
                        changed = true;
                    }
                }
                if changed && edit_timestamp.is_some() {
                    message.last_edit_timestamp = *edit_timestamp;
                }
                changed
            })
        }

        Action::EventUpdateMessageFlags {
            flag,
            operation,
            all,
            message_ids,
            ..
        } => {
            if *all {
                modify(state, |map| {
                    let mut changed = false;
                    for message in map.values_mut() {
                        changed |= apply_flag(message, flag, *operation);
                    }
                    changed
                })
            } else {
                update_flags(state, message_ids, flag, *operation)
            }
        }

        Action::MarkMessagesRead { message_ids } => {
            update_flags(state, message_ids, FLAG_READ, FlagOperation::Add)
        }

        Action::EventReactionAdd {
            message_id,
            reaction,
            ..
        } => with_message(state, *message_id, |message| {
            if message.reactions.iter().any(|r| r.same_as(reaction)) {
                return false;
            }
            message.reactions.push(reaction.clone());
            true
        }),

        Action::EventReactionRemove {
            message_id,
            reaction,
            ..
        } => with_message(state, *message_id, |message| {
            let before = message.reactions.len();
            message.reactions.retain(|r| !r.same_as(reaction));
            message.reactions.len() != before
        }),

        _ => Arc::clone(state),
    }
}

fn upsert(map: &mut MessagesState, message: &Message) -> bool {
    if map.get(&message.id) == Some(message) {
        return false;
    }
    map.insert(message.id, message.clone());
    true
}

fn apply_flag(message: &mut Message, flag: &str, operation: FlagOperation) -> bool {
    match operation {
        FlagOperation::Add => message.flags.insert(flag.to_string()),
        FlagOperation::Remove => message.flags.remove(flag),
    }
}

/// Toggle `flag` on the named messages only. Ids not in the slice are skipped.
fn update_flags(
    state: &Arc<MessagesState>,
    message_ids: &[MessageId],
    flag: &str,
    operation: FlagOperation,
) -> Arc<MessagesState> {
    let needs_change = message_ids.iter().any(|id| {
        state
            .get(id)
            .is_some_and(|m| m.has_flag(flag) != (operation == FlagOperation::Add))
    });
    if !needs_change {
        return Arc::clone(state);
    }
    modify(state, |map| {
        let mut changed = false;
        for id in message_ids {
            if let Some(message) = map.get_mut(id) {
                changed |= apply_flag(message, flag, operation);
            }
        }
        changed
    })
}

fn with_message<F>(state: &Arc<MessagesState>, id: MessageId, f: F) -> Arc<MessagesState>
where
    F: FnOnce(&mut Message) -> bool,
{
    if !state.contains_key(&id) {
        return Arc::clone(state);
    }
    modify(state, |map| map.get_mut(&id).map(f).unwrap_or(false))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_shared::constants::FLAG_STARRED;

    use crate::testing::{eid, reaction, stream_message, OWN_USER};

    fn state() -> Arc<MessagesState> {
        Arc::new(
            [1, 2, 3]
                .into_iter()
                .map(|id| (MessageId(id), stream_message(id, "general", "lunch")))
                .collect(),
        )
    }

    fn new_message(id: u64) -> Action {
        Action::EventNewMessage {
            id: eid(),
            message: Box::new(stream_message(id, "general", "lunch")),
            local_message_id: None,
            own_user_id: OWN_USER,
        }
    }

    #[test]
    fn test_new_message_replaces_existing_copy() {
        let state = state();
        assert!(Arc::ptr_eq(&state, &reduce(&state, &new_message(2))));

        let next = reduce(&state, &new_message(4));
        assert_eq!(next.len(), 4);
    }

    #[test]
    fn test_mark_read_is_idempotent() {
        let state = state();
        let action = Action::MarkMessagesRead {
            message_ids: vec![MessageId(1), MessageId(3), MessageId(99)],
        };
        let once = reduce(&state, &action);
        assert!(once[&MessageId(1)].is_read());
        assert!(!once[&MessageId(2)].is_read());
        assert!(once[&MessageId(3)].is_read());

        let twice = reduce(&once, &action);
        assert!(Arc::ptr_eq(&once, &twice));
    }

    #[test]
    fn test_flags_update_all() {
        let starred = reduce(
            &state(),
            &Action::EventUpdateMessageFlags {
                id: eid(),
                flag: FLAG_STARRED.to_string(),
                operation: FlagOperation::Add,
                all: true,
                message_ids: vec![],
            },
        );
        assert!(starred.values().all(|m| m.has_flag(FLAG_STARRED)));

        let unstarred = reduce(
            &starred,
            &Action::EventUpdateMessageFlags {
                id: eid(),
                flag: FLAG_STARRED.to_string(),
                operation: FlagOperation::Remove,
                all: false,
                message_ids: vec![MessageId(2)],
            },
        );
        assert!(!unstarred[&MessageId(2)].has_flag(FLAG_STARRED));
        assert!(unstarred[&MessageId(1)].has_flag(FLAG_STARRED));
    }

    #[test]
    fn test_update_message_edits_content_and_topic() {
        let next = reduce(
            &state(),
            &Action::EventUpdateMessage {
                id: eid(),
                message_id: MessageId(2),
                content: Some("<p>edited</p>".into()),
                topic: Some("dinner".into()),
                edit_timestamp: Some(1_700_000_000),
            },
        );
        let message = &next[&MessageId(2)];
        assert_eq!(message.content, "<p>edited</p>");
        assert_eq!(message.stream_and_topic(), Some(("general", "dinner")));
        assert_eq!(message.last_edit_timestamp, Some(1_700_000_000));
    }

    #[test]
    fn test_reactions_add_and_remove() {
        let state = state();
        let add = Action::EventReactionAdd {
            id: eid(),
            message_id: MessageId(1),
            reaction: reaction(1, "1f44d"),
        };
        let added = reduce(&state, &add);
        assert_eq!(added[&MessageId(1)].reactions.len(), 1);
        assert!(Arc::ptr_eq(&added, &reduce(&added, &add)));

        let removed = reduce(
            &added,
            &Action::EventReactionRemove {
                id: eid(),
                message_id: MessageId(1),
                reaction: reaction(1, "1f44d"),
            },
        );
        assert!(removed[&MessageId(1)].reactions.is_empty());

        let absent = Action::EventReactionAdd {
            id: eid(),
            message_id: MessageId(77),
            reaction: reaction(1, "1f44d"),
        };
        assert!(Arc::ptr_eq(&state, &reduce(&state, &absent)));
    }

    #[test]
    fn test_delete_and_reset() {
        let state = state();
        let next = reduce(
            &state,
            &Action::EventMessageDelete {
                id: eid(),
                message_ids: vec![MessageId(1), MessageId(50)],
            },
        );
        assert_eq!(next.len(), 2);
        assert!(reduce(&state, &Action::AccountSwitch { index: 1 }).is_empty());
        assert!(Arc::ptr_eq(&state, &reduce(&state, &Action::InitialFetchStart)));
    }
}
