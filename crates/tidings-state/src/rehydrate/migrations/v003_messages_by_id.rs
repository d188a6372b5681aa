//! v003 -- Messages were stored as a list. They are now a map keyed by id.

use serde_json::{Map, Value};
use tidings_shared::constants::SLICE_MESSAGES;

use crate::rehydrate::PersistedState;

pub fn up(raw: &mut PersistedState) {
    let Some(Value::Array(list)) = raw.get_mut(SLICE_MESSAGES) else {
        return;
    };
    let mut by_id = Map::new();
    for message in list.drain(..) {
        // Entries without a numeric id are unusable either way.
        if let Some(id) = message.get("id").and_then(Value::as_u64) {
            by_id.insert(id.to_string(), message);
        }
    }
    raw.insert(SLICE_MESSAGES.to_string(), Value::Object(by_id));
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_list_becomes_map() {
        let mut raw = PersistedState::from([(
            SLICE_MESSAGES.to_string(),
            json!([{ "id": 5, "content": "a" }, { "id": 7, "content": "b" }, { "content": "c" }]),
        )]);
        up(&mut raw);
        assert_eq!(raw[SLICE_MESSAGES]["5"]["content"], "a");
        assert_eq!(raw[SLICE_MESSAGES]["7"]["content"], "b");
        assert_eq!(raw[SLICE_MESSAGES].as_object().map(Map::len), Some(2));
    }

    #[test]
    fn test_map_is_untouched() {
        let messages = json!({ "5": { "id": 5 } });
        let mut raw = PersistedState::from([(SLICE_MESSAGES.to_string(), messages.clone())]);
        up(&mut raw);
        assert_eq!(raw[SLICE_MESSAGES], messages);
    }
}
