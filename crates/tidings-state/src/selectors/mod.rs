//! Pure projections over a [`Snapshot`](crate::Snapshot).
//!
//! Selectors own no state. Expensive projections can be cached with
//! [`Memo`], which recomputes only when the input slice's `Arc` changes.

pub mod accounts;
pub mod memo;
pub mod narrow;
pub mod presence;
pub mod reactions;
pub mod subscriptions;

pub use memo::Memo;
