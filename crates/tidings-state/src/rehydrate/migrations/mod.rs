//! Upgrades of the raw persisted layout.
//!
//! Migrations run in order on every [`crate::rehydrate`] call, on the raw
//! slice map before any slice is decoded. The version the layout conforms to
//! is stored under the `"migrations"` key; a layout without it is version 0.
//! Migrations cannot fail: anything they cannot make sense of is left for
//! the decoder to discard.

pub mod v001_snake_case_keys;
pub mod v002_drop_drafts;
pub mod v003_messages_by_id;

use serde_json::{json, Value};
use tidings_shared::constants::MIGRATIONS_KEY;

use super::PersistedState;

/// Current layout version. Bump this and add a new migration module whenever
/// the shape of a persisted slice changes.
pub const CURRENT_VERSION: u32 = 3;

/// The layout version recorded in `raw`.
pub fn stored_version(raw: &PersistedState) -> u32 {
    raw.get(MIGRATIONS_KEY)
        .and_then(|m| m.get("version"))
        .and_then(Value::as_u64)
        .and_then(|v| u32::try_from(v).ok())
        .unwrap_or(0)
}

/// Apply every migration newer than the stored version, then record
/// [`CURRENT_VERSION`].
pub fn run_migrations(raw: &mut PersistedState) {
    let current = stored_version(raw);

    if current == CURRENT_VERSION {
        return;
    }
    if current > CURRENT_VERSION {
        tracing::warn!(
            current_version = current,
            target_version = CURRENT_VERSION,
            "persisted state is newer than this build, decoding as is"
        );
        return;
    }

    tracing::info!(
        current_version = current,
        target_version = CURRENT_VERSION,
        "migrating persisted state"
    );

    if current < 1 {
        tracing::info!("applying migration v001_snake_case_keys");
        v001_snake_case_keys::up(raw);
    }
    if current < 2 {
        tracing::info!("applying migration v002_drop_drafts");
        v002_drop_drafts::up(raw);
    }
    if current < 3 {
        tracing::info!("applying migration v003_messages_by_id");
        v003_messages_by_id::up(raw);
    }

    raw.insert(
        MIGRATIONS_KEY.to_string(),
        json!({ "version": CURRENT_VERSION }),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stored_version() {
        let mut raw = PersistedState::new();
        assert_eq!(stored_version(&raw), 0);
        raw.insert(MIGRATIONS_KEY.to_string(), json!({ "version": 2 }));
        assert_eq!(stored_version(&raw), 2);
        raw.insert(MIGRATIONS_KEY.to_string(), json!("garbage"));
        assert_eq!(stored_version(&raw), 0);
    }

    #[test]
    fn test_migrations_only_run_once() {
        let mut raw = PersistedState::new();
        raw.insert("drafts".to_string(), json!({ "x": "draft" }));
        run_migrations(&mut raw);
        assert_eq!(raw["drafts"], Value::Null);
        assert_eq!(stored_version(&raw), CURRENT_VERSION);

        raw.insert("drafts".to_string(), json!({ "topic:a\nb": "kept" }));
        run_migrations(&mut raw);
        assert_eq!(raw["drafts"]["topic:a\nb"], "kept");
    }

    #[test]
    fn test_newer_layout_is_left_alone() {
        let mut raw = PersistedState::new();
        raw.insert(MIGRATIONS_KEY.to_string(), json!({ "version": 99 }));
        raw.insert("drafts".to_string(), json!({ "x": "draft" }));
        run_migrations(&mut raw);
        assert_eq!(raw["drafts"]["x"], "draft");
        assert_eq!(stored_version(&raw), 99);
    }
}
