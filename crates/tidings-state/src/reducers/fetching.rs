//! Per-narrow fetch progress, keyed by [`Narrow::key`]. Never persisted.
//!
//! [`Narrow::key`]: tidings_shared::narrow::Narrow::key

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{initial, modify, set};
use crate::action::Action;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FetchStatus {
    pub fetching_older: bool,
    pub fetching_newer: bool,
    /// The oldest message of the narrow is loaded.
    pub caught_up_older: bool,
    /// The newest message of the narrow is loaded.
    pub caught_up_newer: bool,
}

pub type FetchingState = BTreeMap<String, FetchStatus>;

pub fn reduce(state: &Arc<FetchingState>, action: &Action) -> Arc<FetchingState> {
    match action {
        a if a.resets_account_data() => initial(state),
        Action::RegisterComplete(_) | Action::DeadQueue => initial(state),

        Action::MessageFetchStart {
            narrow,
            num_before,
            num_after,
        } => update(state, narrow.key(), |status| {
            let mut changed = false;
            if *num_before > 0 {
                changed |= set(&mut status.fetching_older, true);
            }
            if *num_after > 0 {
                changed |= set(&mut status.fetching_newer, true);
            }
            changed
        }),

        Action::MessageFetchComplete {
            narrow,
            num_before,
            num_after,
            found_oldest,
            found_newest,
            ..
        } => update(state, narrow.key(), |status| {
            let mut changed = false;
            if *num_before > 0 {
                changed |= set(&mut status.fetching_older, false);
                changed |= set(&mut status.caught_up_older, *found_oldest);
            }
            if *num_after > 0 {
                changed |= set(&mut status.fetching_newer, false);
                changed |= set(&mut status.caught_up_newer, *found_newest);
            }
            changed
        }),

        Action::MessageFetchFailed { narrow } => update(state, narrow.key(), |status| {
            set(&mut status.fetching_older, false) | set(&mut status.fetching_newer, false)
        }),

        _ => Arc::clone(state),
    }
}

fn update<F>(state: &Arc<FetchingState>, key: String, f: F) -> Arc<FetchingState>
where
    F: FnOnce(&mut FetchStatus) -> bool,
{
    modify(state, |map| {
        let mut status = map.get(&key).copied().unwrap_or_default();
        if !f(&mut status) {
            return false;
        }
        map.insert(key, status);
        true
    })
}
