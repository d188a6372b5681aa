//! # tidings-store
//!
//! Local persistence of the client state, backed by SQLite.
//!
//! The persisted layout is one row per slice: the slice name and its JSON
//! text. The crate exposes a synchronous [`Database`] handle wrapping a
//! `rusqlite::Connection`, slice-level read/write helpers, and a
//! [`Persistor`] that writes only the slices a dispatch actually changed.

pub mod database;
pub mod migrations;
pub mod persistor;
pub mod slices;

mod error;

pub use database::Database;
pub use error::{Result, StoreError};
pub use persistor::Persistor;
