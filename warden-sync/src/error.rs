//! Error types for warden-sync.

use std::path::PathBuf;

use thiserror::Error;

use warden_core::LockError;

/// All errors that can arise from change detection and orchestration.
///
/// Collaborator script failures are never errors — they are recorded as
/// failed [`warden_core::SyncResult`]s so one domain cannot abort the run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (cache and report files).
    #[error("state file JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error from the session lock.
    #[error("lock error: {0}")]
    Lock(#[from] LockError),

    /// `--only` named a domain that is not in the registry.
    #[error("unknown domain '{name}'; valid domains: {valid}")]
    UnknownDomain { name: String, valid: String },
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}
