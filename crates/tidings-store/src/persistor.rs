//! Incremental persistence of published snapshots.
//!
//! The persistor remembers the last snapshot it wrote and, on the next save,
//! writes only the persisted slices whose `Arc` is a different allocation.
//! Reducers hand back the same `Arc` for untouched slices, so this is exact.

use std::sync::Arc;

use tidings_shared::constants::MIGRATIONS_KEY;
use tidings_state::rehydrate::migrations::stored_version;
use tidings_state::rehydrate::CURRENT_VERSION;
use tidings_state::snapshot::{migrations_marker, PERSISTED_SLICES};
use tidings_state::{PersistedState, Snapshot};

use crate::database::Database;
use crate::error::Result;

pub struct Persistor {
    db: Database,
    last_saved: Option<Arc<Snapshot>>,
}

impl Persistor {
    /// A persistor with nothing saved yet: the first save writes every slice.
    pub fn new(db: Database) -> Self {
        Self {
            db,
            last_saved: None,
        }
    }

    /// Read back whatever was stored, for the rehydration gate.
    pub fn load(&self) -> Result<PersistedState> {
        self.db.load_persisted()
    }

    /// Treat `snapshot`, rehydrated from `loaded`, as already stored.
    ///
    /// Only when `loaded` is in the current layout: after a layout migration
    /// the rows on disk still hold the old shapes and keys, so the next save
    /// has to rewrite all of them.
    pub fn set_baseline(&mut self, loaded: &PersistedState, snapshot: &Arc<Snapshot>) {
        let version = stored_version(loaded);
        let stray = loaded
            .keys()
            .find(|key| key.as_str() != MIGRATIONS_KEY && !PERSISTED_SLICES.contains(&key.as_str()));
        if version < CURRENT_VERSION || (version == CURRENT_VERSION && stray.is_some()) {
            tracing::info!(
                stored_version = version,
                stray_key = ?stray,
                "persisted layout will be rewritten on next save"
            );
            self.last_saved = None;
        } else {
            self.last_saved = Some(Arc::clone(snapshot));
        }
    }

    /// Write the slices that changed since the last save, or the whole layout
    /// when there is no baseline. Returns how many slices were written.
    pub fn save(&mut self, snapshot: &Arc<Snapshot>) -> Result<usize> {
        let names: Vec<&'static str> = match &self.last_saved {
            Some(prev) if Arc::ptr_eq(prev, snapshot) => return Ok(0),
            Some(prev) => snapshot.changed_persisted_slices(prev),
            None => PERSISTED_SLICES.to_vec(),
        };

        if !names.is_empty() {
            let mut rows = Vec::with_capacity(names.len() + 1);
            for name in &names {
                if let Some(value) = snapshot.slice_to_value(name) {
                    rows.push((*name, value?));
                }
            }
            rows.push((MIGRATIONS_KEY, migrations_marker()));
            if self.last_saved.is_some() {
                self.db.save_slices(rows)?;
                tracing::debug!(slices = ?names, "persisted changed slices");
            } else {
                self.db.replace_slices(rows)?;
                tracing::debug!("rewrote persisted layout");
            }
        }

        self.last_saved = Some(Arc::clone(snapshot));
        Ok(names.len())
    }

    /// Forget everything stored, e.g. on logout.
    pub fn purge(&mut self) -> Result<()> {
        self.db.purge()?;
        self.last_saved = None;
        Ok(())
    }
}
