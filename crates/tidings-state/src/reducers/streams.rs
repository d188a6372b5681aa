use std::collections::BTreeMap;
use std::sync::Arc;

use tidings_shared::models::Stream;
use tidings_shared::types::StreamId;

use super::{initial, modify, replace};
use crate::action::Action;

pub type StreamsState = BTreeMap<StreamId, Stream>;

pub fn reduce(state: &Arc<StreamsState>, action: &Action) -> Arc<StreamsState> {
    match action {
        Action::Rehydrate(snapshot) => Arc::clone(&snapshot.streams),
        a if a.resets_account_data() => initial(state),

        Action::RegisterComplete(data) => replace(state, by_id(&data.streams)),
        Action::InitStreams { streams } => replace(state, by_id(streams)),

        Action::EventStreamAdd { streams, .. } | Action::EventStreamOccupy { streams, .. } => {
            modify(state, |map| {
                let mut changed = false;
                for stream in streams {
                    if map.get(&stream.stream_id) != Some(stream) {
                        map.insert(stream.stream_id, stream.clone());
                        changed = true;
                    }
                }
                changed
            })
        }

        Action::EventStreamRemove { stream_ids, .. } => modify(state, |map| {
            let mut changed = false;
            for id in stream_ids {
                changed |= map.remove(id).is_some();
            }
            changed
        }),

        Action::EventStreamUpdate {
            stream_id,
            property,
            value,
            ..
        } => {
            if !state.contains_key(stream_id) {
                return Arc::clone(state);
            }
            modify(state, |map| {
                map.get_mut(stream_id)
                    .map(|s| s.set_property(property, value))
                    .unwrap_or(false)
            })
        }

        _ => Arc::clone(state),
    }
}

fn by_id(streams: &[Stream]) -> StreamsState {
    streams.iter().map(|s| (s.stream_id, s.clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use crate::testing::{eid, stream};

    #[test]
    fn test_init_and_update() {
        let empty = Arc::new(StreamsState::new());
        let state = reduce(
            &empty,
            &Action::InitStreams {
                streams: vec![stream(1, "general"), stream(2, "dev")],
            },
        );
        assert_eq!(state.len(), 2);

        let renamed = reduce(
            &state,
            &Action::EventStreamUpdate {
                id: eid(),
                stream_id: StreamId(2),
                property: "name".into(),
                value: json!("engineering"),
            },
        );
        assert_eq!(renamed[&StreamId(2)].name, "engineering");

        let unknown_property = Action::EventStreamUpdate {
            id: eid(),
            stream_id: StreamId(2),
            property: "stream_post_policy".into(),
            value: json!(2),
        };
        assert!(Arc::ptr_eq(&renamed, &reduce(&renamed, &unknown_property)));
    }

    #[test]
    fn test_add_occupy_remove() {
        let state = Arc::new(StreamsState::new());
        let added = reduce(
            &state,
            &Action::EventStreamAdd {
                id: eid(),
                streams: vec![stream(1, "general")],
            },
        );
        let occupied = reduce(
            &added,
            &Action::EventStreamOccupy {
                id: eid(),
                streams: vec![stream(1, "general")],
            },
        );
        assert!(Arc::ptr_eq(&added, &occupied));

        let removed = reduce(
            &occupied,
            &Action::EventStreamRemove {
                id: eid(),
                stream_ids: vec![StreamId(1), StreamId(8)],
            },
        );
        assert!(removed.is_empty());
    }
}
