//! Error types for warden-core.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from session-lock mutations.
///
/// The read-only status probe never returns these; unreadable or invalid
/// lock content is classified as [`crate::lock::LockStatus::Corrupt`] instead.
#[derive(Debug, Error)]
pub enum LockError {
    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON serialization/deserialization error (lock file).
    #[error("session lock JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Refusal to clear an ACTIVE lock without the override flag.
    #[error("cannot clear ACTIVE session lock (started {session_start}) without force")]
    ActiveLock { session_start: String },
}

/// Convenience constructor for [`LockError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> LockError {
    LockError::Io {
        path: path.into(),
        source,
    }
}
