//! # tidings-state
//!
//! The client-side mirror of server state.
//!
//! Every change goes through one [`Action`] dispatched into [`root::reduce`],
//! which hands the action to one reducer per slice and assembles a new
//! immutable [`Snapshot`]. Slices are held behind `Arc`s: a reducer that does
//! not care about an action returns the very same `Arc`, and a dispatch that
//! changes nothing returns the very same snapshot.
//!
//! Persisted state from a previous run must go through [`rehydrate()`] before
//! it becomes live.

pub mod action;
pub mod reducers;
pub mod rehydrate;
pub mod root;
pub mod selectors;
pub mod snapshot;

pub use action::Action;
pub use rehydrate::{rehydrate, PersistedState};
pub use snapshot::Snapshot;

#[cfg(test)]
pub(crate) mod testing;
