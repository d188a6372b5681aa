//! Read and write persisted state slices.

use chrono::Utc;
use rusqlite::params;
use serde_json::Value;
use tidings_state::PersistedState;

use crate::database::Database;
use crate::error::Result;

impl Database {
    // ------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------

    /// Insert or replace one slice.
    pub fn save_slice(&self, name: &str, content: &Value) -> Result<()> {
        let text = serde_json::to_string(content)?;
        self.conn().execute(
            "INSERT INTO slices (name, content, updated_at)
             VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET
                 content = excluded.content,
                 updated_at = excluded.updated_at",
            params![name, text, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Write several slices in one transaction.
    pub fn save_slices<'a, I>(&mut self, slices: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn_mut().transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO slices (name, content, updated_at)
                 VALUES (?1, ?2, ?3)
                 ON CONFLICT(name) DO UPDATE SET
                     content = excluded.content,
                     updated_at = excluded.updated_at",
            )?;
            for (name, content) in slices {
                stmt.execute(params![name, serde_json::to_string(&content)?, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Replace the whole stored layout with `slices` in one transaction.
    /// Rows not listed, such as keys renamed by a layout migration, are
    /// removed.
    pub fn replace_slices<'a, I>(&mut self, slices: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let now = Utc::now().to_rfc3339();
        let tx = self.conn_mut().transaction()?;
        tx.execute("DELETE FROM slices", [])?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO slices (name, content, updated_at) VALUES (?1, ?2, ?3)",
            )?;
            for (name, content) in slices {
                stmt.execute(params![name, serde_json::to_string(&content)?, now])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Every stored slice. Rows whose content is not valid JSON come back as
    /// `null`, which the rehydration gate treats as missing.
    pub fn load_persisted(&self) -> Result<PersistedState> {
        let mut stmt = self.conn().prepare("SELECT name, content FROM slices")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut persisted = PersistedState::new();
        for row in rows {
            let (name, text) = row?;
            let value = match serde_json::from_str(&text) {
                Ok(value) => value,
                Err(e) => {
                    tracing::warn!(slice = %name, error = %e, "unreadable persisted slice");
                    Value::Null
                }
            };
            persisted.insert(name, value);
        }
        Ok(persisted)
    }

    // ------------------------------------------------------------------
    // Delete
    // ------------------------------------------------------------------

    /// Remove one slice. Returns whether it existed.
    pub fn delete_slice(&self, name: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM slices WHERE name = ?1", params![name])?;
        Ok(affected > 0)
    }

    /// Remove every stored slice.
    pub fn purge(&self) -> Result<usize> {
        let affected = self.conn().execute("DELETE FROM slices", [])?;
        tracing::info!(removed = affected, "purged persisted state");
        Ok(affected)
    }
}
