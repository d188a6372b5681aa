//! The gate persisted state passes through before it becomes live.
//!
//! The persisted layout is a map from slice name to JSON value. It may come
//! from an older release, be missing slices, or hold `null` where a slice
//! could not be read back. [`rehydrate`] first upgrades the raw map with the
//! numbered [`migrations`], then decodes each persisted slice on its own:
//! absent or `null` slices, and slices whose shape no longer decodes, start
//! from their initial value. Runtime-only slices always start fresh.

pub mod migrations;

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tidings_shared::constants::{
    SLICE_ACCOUNTS, SLICE_DRAFTS, SLICE_MESSAGES, SLICE_MUTE, SLICE_OUTBOX, SLICE_REALM,
    SLICE_SETTINGS, SLICE_STREAMS, SLICE_SUBSCRIPTIONS, SLICE_TOPICS, SLICE_USERS,
    SLICE_USER_GROUPS,
};

use crate::snapshot::Snapshot;

pub use migrations::CURRENT_VERSION;

/// Slice name to raw JSON, as read from storage.
pub type PersistedState = BTreeMap<String, Value>;

#[derive(Debug, Error)]
pub enum RehydrateError {
    #[error("persisted slice `{slice}` has an unexpected shape: {source}")]
    Decode {
        slice: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Build a live snapshot from persisted state. Never fails: whatever cannot
/// be restored starts from its initial value.
pub fn rehydrate(persisted: &PersistedState) -> Snapshot {
    let mut raw = persisted.clone();
    migrations::run_migrations(&mut raw);

    Snapshot {
        accounts: Arc::new(load(&raw, SLICE_ACCOUNTS)),
        settings: Arc::new(load(&raw, SLICE_SETTINGS)),
        realm: Arc::new(load(&raw, SLICE_REALM)),
        users: Arc::new(load(&raw, SLICE_USERS)),
        streams: Arc::new(load(&raw, SLICE_STREAMS)),
        subscriptions: Arc::new(load(&raw, SLICE_SUBSCRIPTIONS)),
        topics: Arc::new(load(&raw, SLICE_TOPICS)),
        messages: Arc::new(load(&raw, SLICE_MESSAGES)),
        outbox: Arc::new(load(&raw, SLICE_OUTBOX)),
        drafts: Arc::new(load(&raw, SLICE_DRAFTS)),
        user_groups: Arc::new(load(&raw, SLICE_USER_GROUPS)),
        mute: Arc::new(load(&raw, SLICE_MUTE)),
        ..Snapshot::default()
    }
}

/// Decode one slice. `Ok(None)` when it is absent or `null`.
fn decode<T>(raw: &PersistedState, slice: &'static str) -> Result<Option<T>, RehydrateError>
where
    T: DeserializeOwned,
{
    match raw.get(slice) {
        None | Some(Value::Null) => Ok(None),
        Some(value) => T::deserialize(value)
            .map(Some)
            .map_err(|source| RehydrateError::Decode { slice, source }),
    }
}

fn load<T>(raw: &PersistedState, slice: &'static str) -> T
where
    T: DeserializeOwned + Default,
{
    match decode(raw, slice) {
        Ok(Some(value)) => value,
        Ok(None) => T::default(),
        Err(e) => {
            tracing::warn!(slice, error = %e, "discarding persisted slice");
            T::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tidings_shared::constants::MIGRATIONS_KEY;
    use tidings_shared::types::{MessageId, StreamId};

    use crate::snapshot::PERSISTED_SLICES;
    use crate::testing::{stream, stream_message};

    fn persisted(value: Value) -> PersistedState {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_null_slice_and_keyed_messages() {
        let message = serde_json::to_value(stream_message(5, "general", "lunch")).unwrap();
        let state = persisted(json!({
            "streams": null,
            "messages": { "5": message },
        }));
        let snapshot = rehydrate(&state);
        assert!(snapshot.streams.is_empty());
        assert_eq!(snapshot.messages.len(), 1);
        assert_eq!(snapshot.messages[&MessageId(5)].id, MessageId(5));
    }

    #[test]
    fn test_empty_input_gives_initial_snapshot() {
        assert_eq!(rehydrate(&PersistedState::new()), Snapshot::default());
    }

    #[test]
    fn test_bad_slice_is_discarded_alone() {
        let state = persisted(json!({
            "streams": { "1": serde_json::to_value(stream(1, "general")).unwrap() },
            "user_groups": "not a list",
            "migrations": { "version": CURRENT_VERSION },
        }));
        let snapshot = rehydrate(&state);
        assert!(snapshot.user_groups.is_empty());
        assert_eq!(snapshot.streams[&StreamId(1)].name, "general");
    }

    #[test]
    fn test_round_trip_through_persisted_layout() {
        let snapshot = Snapshot {
            streams: Arc::new([(StreamId(1), stream(1, "general"))].into()),
            messages: Arc::new([(MessageId(5), stream_message(5, "general", "lunch"))].into()),
            ..Snapshot::default()
        };
        let persisted = snapshot.to_persisted().unwrap();
        assert_eq!(persisted.len(), PERSISTED_SLICES.len() + 1);
        assert!(persisted.contains_key(MIGRATIONS_KEY));
        assert_eq!(rehydrate(&persisted), snapshot);
    }

    #[test]
    fn test_runtime_slices_start_fresh() {
        let state = persisted(json!({ "session": { "is_online": false } }));
        let snapshot = rehydrate(&state);
        assert!(snapshot.session.is_online);
    }
}
