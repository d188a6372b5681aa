//! Per-stream topic lists, most recent first.

use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_shared::models::{Destination, Topic};
use tidings_shared::types::{MessageId, StreamId};

use super::{initial, modify};
use crate::action::Action;

pub type TopicsState = BTreeMap<StreamId, Vec<Topic>>;

pub fn reduce(state: &Arc<TopicsState>, action: &Action) -> Arc<TopicsState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.topics),
        a if a.resets_account_data() => initial(state),

        Action::InitTopics { stream_id, topics } => modify(state, |map| {
            if map.get(stream_id) == Some(topics) {
                return false;
            }
            map.insert(*stream_id, topics.clone());
            true
        }),

        Action::EventNewMessage { message, .. } => {
            let Destination::Stream {
                stream_id, topic, ..
            } = &message.destination
            else {
                return Arc::clone(state);
            };
            // Streams whose list was never fetched stay unfetched.
            if !state.contains_key(stream_id) {
                return Arc::clone(state);
            }
            modify(state, |map| {
                let Some(topics) = map.get_mut(stream_id) else {
                    return false;
                };
                bump(topics, topic, message.id)
            })
        }

        _ => Arc::clone(state),
    }
}

/// Raise `name` to `max_id`, inserting it if new, and keep the list ordered
/// newest first. Older messages in an already newer topic change nothing.
fn bump(topics: &mut Vec<Topic>, name: &str, max_id: MessageId) -> bool {
    let topic = match topics.iter().position(|t| t.name == name) {
        Some(i) if topics[i].max_id >= max_id => return false,
        Some(i) => {
            let mut topic = topics.remove(i);
            topic.max_id = max_id;
            topic
        }
        None => Topic {
            name: name.to_string(),
            max_id,
        },
    };
    let at = topics
        .iter()
        .position(|t| t.max_id < max_id)
        .unwrap_or(topics.len());
    topics.insert(at, topic);
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tidings_shared::models::Message;

    use crate::testing::{eid, private_message, stream_message, OWN_USER};

    fn topic(name: &str, max_id: u64) -> Topic {
        Topic {
            name: name.to_string(),
            max_id: MessageId(max_id),
        }
    }

    fn new_message(message: Message) -> Action {
        Action::EventNewMessage {
            id: eid(),
            message: Box::new(message),
            local_message_id: None,
            own_user_id: OWN_USER,
        }
    }

    fn state() -> Arc<TopicsState> {
        Arc::new(BTreeMap::from([(
            StreamId(10),
            vec![topic("lunch", 20), topic("standup", 10)],
        )]))
    }

    #[test]
    fn test_older_message_keeps_recency_order() {
        let next = reduce(&state(), &new_message(stream_message(5, "general", "archive")));
        assert_eq!(
            next[&StreamId(10)],
            vec![topic("lunch", 20), topic("standup", 10), topic("archive", 5)]
        );

        let next = reduce(&next, &new_message(stream_message(15, "general", "archive")));
        assert_eq!(
            next[&StreamId(10)],
            vec![topic("lunch", 20), topic("archive", 15), topic("standup", 10)]
        );
    }

    #[test]
    fn test_new_message_bumps_topic() {
        let next = reduce(&state(), &new_message(stream_message(30, "general", "standup")));
        assert_eq!(next[&StreamId(10)], vec![topic("standup", 30), topic("lunch", 20)]);

        let inserted = reduce(&next, &new_message(stream_message(31, "general", "retro")));
        assert_eq!(inserted[&StreamId(10)][0], topic("retro", 31));
        assert_eq!(inserted[&StreamId(10)].len(), 3);
    }

    #[test]
    fn test_unrelated_messages_change_nothing() {
        let state = state();
        for message in [
            stream_message(5, "general", "lunch"),
            private_message(40, &[1, 2]),
        ] {
            assert!(Arc::ptr_eq(&state, &reduce(&state, &new_message(message))));
        }

        let empty = Arc::new(TopicsState::new());
        let untouched = reduce(&empty, &new_message(stream_message(50, "general", "x")));
        assert!(Arc::ptr_eq(&empty, &untouched));
    }

    #[test]
    fn test_init_topics_replaces_stream_list() {
        let next = reduce(
            &state(),
            &Action::InitTopics {
                stream_id: StreamId(10),
                topics: vec![topic("only", 3)],
            },
        );
        assert_eq!(next[&StreamId(10)], vec![topic("only", 3)]);
    }
}
