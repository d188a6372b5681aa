use thiserror::Error;

/// Errors produced while storing or loading persisted slices.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// No home or data directory to put the default database in.
    #[error("Could not determine the platform data directory")]
    NoDataDir,

    /// Creating the database directory failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Schema migration failed: {0}")]
    Migration(String),

    /// A slice could not be encoded as JSON.
    #[error("Slice encoding error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;
