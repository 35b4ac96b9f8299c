//! Error types for gas-sync-engine.

use std::path::PathBuf;

use thiserror::Error;

use gas_sync_core::error::{GatewayError, ProjectError};

/// All errors that can arise from sync operations.
#[derive(Debug, Error)]
pub enum SyncError {
    /// An error from the project state store.
    #[error("project error: {0}")]
    Project(#[from] ProjectError),

    /// An error from the remote gateway or its credential provider.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// A local I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Filesystem watcher failure (watch mode only).
    #[error("watch error: {0}")]
    Watch(#[from] notify::Error),

    /// A background task failed to complete.
    #[error("background task failed: {0}")]
    Task(String),
}

/// Convenience constructor for [`SyncError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> SyncError {
    SyncError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`SyncError::Task`] from a join failure.
pub(crate) fn task_err(err: tokio::task::JoinError) -> SyncError {
    SyncError::Task(err.to_string())
}
