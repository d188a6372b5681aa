//! v001 -- Initial schema creation.
//!
//! Creates the `slices` table: one row per persisted state slice.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS slices (
    name       TEXT PRIMARY KEY NOT NULL,   -- slice name, or "migrations"
    content    TEXT NOT NULL,               -- JSON
    updated_at TEXT NOT NULL                -- RFC-3339
);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
