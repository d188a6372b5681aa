//! v001 -- The first layout used camelCase keys: `userGroups` at the top
//! level and camelCase field names inside `realm` and `settings`.

use serde_json::{Map, Value};
use tidings_shared::constants::{SLICE_REALM, SLICE_SETTINGS, SLICE_USER_GROUPS};

use crate::rehydrate::PersistedState;

const RENAMED_SLICES: [(&str, &str); 1] = [("userGroups", SLICE_USER_GROUPS)];

pub fn up(raw: &mut PersistedState) {
    for (old, new) in RENAMED_SLICES {
        if let Some(value) = raw.remove(old) {
            raw.entry(new.to_string()).or_insert(value);
        }
    }
    for slice in [SLICE_REALM, SLICE_SETTINGS] {
        if let Some(Value::Object(fields)) = raw.get_mut(slice) {
            let renamed: Map<String, Value> = std::mem::take(fields)
                .into_iter()
                .map(|(key, value)| (snake_case(&key), value))
                .collect();
            *fields = renamed;
        }
    }
}

fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}
