//! # tidings-client
//!
//! The seam between the event queue and the state core: [`events`] turns
//! server payloads into actions, [`store::Store`] dispatches them and
//! publishes snapshots.

pub mod config;
pub mod events;
pub mod store;

pub use config::ClientConfig;
pub use events::{translate, TranslateError};
pub use store::Store;

use tracing_subscriber::EnvFilter;

/// Install the `fmt` subscriber. Respects `RUST_LOG`.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("tidings_client=debug,tidings_state=info,tidings_store=info,warn")
        }))
        .try_init();
}
