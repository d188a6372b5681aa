//! # tidings-replay
//!
//! Replays a recorded event queue against the persisted client state.
//!
//! Each line of the input file is one event payload as the server sent it.
//! The tool loads the stored slices, passes them through the rehydration
//! gate, translates and dispatches every event in order, and writes the
//! changed slices back.

use anyhow::Context;
use serde_json::Value;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

use tidings_client::{events, init_tracing, ClientConfig, Store};
use tidings_state::Action;
use tidings_store::{Database, Persistor};

#[derive(Debug, Default)]
struct ReplayStats {
    dispatched: usize,
    changed: usize,
    unknown: usize,
    rejected: usize,
    slices_written: usize,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Tracing and configuration
    // -----------------------------------------------------------------------
    init_tracing();

    let input = std::env::args()
        .nth(1)
        .context("usage: tidings-replay <events.jsonl>")?;

    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    // -----------------------------------------------------------------------
    // 2. Persisted state through the rehydration gate
    // -----------------------------------------------------------------------
    let db = match &config.db_path {
        Some(path) => Database::open_at(path)?,
        None => Database::open_default()?,
    };
    let mut persistor = Persistor::new(db);
    let mut store = Store::new();
    let persisted = persistor.load()?;
    let hydrated = store.rehydrate(&persisted);
    persistor.set_baseline(&persisted, &hydrated);
    info!(
        messages = hydrated.messages.len(),
        streams = hydrated.streams.len(),
        "state rehydrated"
    );

    // -----------------------------------------------------------------------
    // 3. Replay
    // -----------------------------------------------------------------------
    let file = File::open(&input)
        .await
        .with_context(|| format!("cannot open {input}"))?;
    let mut lines = BufReader::new(file).lines();
    let mut stats = ReplayStats::default();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let event: Value = match serde_json::from_str(line) {
            Ok(event) => event,
            Err(e) => {
                warn!(line_number, error = %e, "skipping unparseable line");
                stats.rejected += 1;
                continue;
            }
        };

        let prev = store.snapshot();
        let action = match events::translate(&prev, &event) {
            Ok(action) => action,
            Err(e) => {
                warn!(line_number, error = %e, "rejected event");
                stats.rejected += 1;
                continue;
            }
        };
        if matches!(action, Action::Unknown { .. }) {
            stats.unknown += 1;
        }

        let next = store.dispatch(action);
        stats.dispatched += 1;
        if !std::sync::Arc::ptr_eq(&prev, &next) {
            stats.changed += 1;
        }

        if config.persist && stats.dispatched % config.persist_every == 0 {
            stats.slices_written += persistor.save(&next)?;
        }
    }

    // -----------------------------------------------------------------------
    // 4. Final flush and summary
    // -----------------------------------------------------------------------
    if config.persist {
        stats.slices_written += persistor.save(&store.snapshot())?;
    }

    let snapshot = store.snapshot();
    info!(
        dispatched = stats.dispatched,
        changed = stats.changed,
        unknown = stats.unknown,
        rejected = stats.rejected,
        slices_written = stats.slices_written,
        messages = snapshot.messages.len(),
        last_event_id = snapshot.session.last_event_id,
        "replay finished"
    );

    Ok(())
}
