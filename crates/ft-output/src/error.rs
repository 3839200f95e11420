//! Error types for ft-output.

use thiserror::Error;

/// Errors that can occur when talking to a graph store.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[cfg(feature = "sqlite")]
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// The background queue is full and the work was dropped.
    #[error("store queue is full, {what} dropped")]
    QueueFull { what: &'static str },

    /// The background worker has exited and can take no more work.
    #[error("store worker is gone")]
    WorkerGone,

    #[error("failed to start store worker: {0}")]
    Spawn(String),
}

/// Alias for `Result<T, OutputError>`.
pub type OutputResult<T> = Result<T, OutputError>;
