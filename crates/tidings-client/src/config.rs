//! Client configuration loaded from environment variables.
//!
//! Every setting has a default so the replay tool runs with no configuration.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// SQLite file holding the persisted slices.
    /// Env: `TIDINGS_DB_PATH`
    /// Default: `None`, meaning `tidings.db` in the platform data directory.
    pub db_path: Option<PathBuf>,

    /// Whether state is written back at all.
    /// Env: `TIDINGS_PERSIST` (true/false)
    /// Default: `true`
    pub persist: bool,

    /// Dispatches between two persistence flushes.
    /// Env: `TIDINGS_PERSIST_EVERY`
    /// Default: `1`
    pub persist_every: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            persist: true,
            persist_every: 1,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(path) = lookup("TIDINGS_DB_PATH") {
            if !path.is_empty() {
                config.db_path = Some(PathBuf::from(path));
            }
        }

        if let Some(val) = lookup("TIDINGS_PERSIST") {
            config.persist = val != "false" && val != "0";
        }

        if let Some(val) = lookup("TIDINGS_PERSIST_EVERY") {
            match val.parse::<usize>() {
                Ok(n) if n > 0 => config.persist_every = n,
                _ => tracing::warn!(value = %val, "Invalid TIDINGS_PERSIST_EVERY, using default"),
            }
        }

        config
    }
}
