//! v002 -- Drafts were keyed by the serialized narrow. They are now keyed by
//! conversation, and the old keys cannot be mapped reliably, so old drafts
//! are dropped.

use serde_json::Value;
use tidings_shared::constants::SLICE_DRAFTS;

use crate::rehydrate::PersistedState;

pub fn up(raw: &mut PersistedState) {
    if let Some(drafts) = raw.get_mut(SLICE_DRAFTS) {
        *drafts = Value::Null;
    }
}
