//! Error types for warden-gate.

use std::path::PathBuf;

use thiserror::Error;

use warden_sync::SyncError;

/// All errors that can arise from running the preflight gate.
#[derive(Debug, Error)]
pub enum GateError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (report file).
    #[error("preflight report JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error from the sync layer.
    #[error("sync error: {0}")]
    Sync(#[from] SyncError),
}

/// Convenience constructor for [`GateError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> GateError {
    GateError::Io {
        path: path.into(),
        source,
    }
}
