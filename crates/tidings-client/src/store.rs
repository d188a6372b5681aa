//! The single writer of client state.
//!
//! [`Store::dispatch`] runs the root reducer and publishes the resulting
//! snapshot on a `watch` channel. `&mut self` keeps dispatches strictly
//! sequential; readers only ever see complete snapshots.

use std::sync::Arc;

use serde_json::Value;
use tidings_state::{rehydrate, root, Action, PersistedState, Snapshot};
use tokio::sync::watch;

use crate::events::{self, TranslateError};

pub struct Store {
    tx: watch::Sender<Arc<Snapshot>>,
}

impl Store {
    /// A store holding the initial snapshot. Nothing is hydrated yet.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(Snapshot::default()));
        Self { tx }
    }

    /// Pass `persisted` through the rehydration gate and dispatch the result.
    pub fn rehydrate(&mut self, persisted: &PersistedState) -> Arc<Snapshot> {
        let snapshot = rehydrate(persisted);
        self.dispatch(Action::Rehydrate(Box::new(snapshot)))
    }

    /// Apply one action. Subscribers are only notified when the snapshot
    /// actually changed.
    pub fn dispatch(&mut self, action: Action) -> Arc<Snapshot> {
        let prev = self.snapshot();
        let next = root::reduce(&prev, &action);
        let changed = !Arc::ptr_eq(&prev, &next);
        tracing::debug!(action = action.name(), changed, "dispatched");
        if changed {
            self.tx.send_replace(Arc::clone(&next));
        }
        next
    }

    /// Translate a server event against the current snapshot and dispatch it.
    pub fn handle_event(&mut self, event: &Value) -> Result<Arc<Snapshot>, TranslateError> {
        let action = events::translate(&self.snapshot(), event)?;
        Ok(self.dispatch(action))
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.tx.borrow())
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<Snapshot>> {
        self.tx.subscribe()
    }

    /// Drop all state, as for a fresh install. Subscribers see the reset.
    pub fn reset(&mut self) -> Arc<Snapshot> {
        let initial = Arc::new(Snapshot::default());
        self.tx.send_replace(Arc::clone(&initial));
        tracing::info!("store reset");
        initial
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new()
    }
}
