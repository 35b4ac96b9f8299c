//! Error types for gas-sync-core.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{Alias, RemoteName};

/// All errors that can arise from project-state operations.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error (write/save path).
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// The directory has no state file — it is not a gas-sync project.
    #[error("not a gas-sync project (missing {path})")]
    NotAProject { path: PathBuf },

    /// State file exists but is not parsable as project state.
    #[error("failed to parse project state at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The referenced remote name is absent from the project.
    #[error("no remote named '{name}' in this project")]
    NoSuchRemote { name: RemoteName },

    /// A remote with this name is already configured.
    #[error("remote '{name}' already exists (pass --force to replace it)")]
    RemoteExists { name: RemoteName },
}

/// All errors that can arise from gateway and credential operations.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The alias cannot be resolved to a usable client.
    #[error("cannot authenticate alias '{alias}': {message}")]
    Credential { alias: Alias, message: String },

    /// The remote service rejected the call with an HTTP status.
    #[error("remote call failed with status {status}: {message}")]
    Status { status: u16, message: String },

    /// Network-level failure before any response was produced.
    #[error("transport error: {0}")]
    Transport(String),

    /// The remote answered, but with a payload we cannot interpret.
    #[error("malformed remote payload: {0}")]
    Payload(String),

    /// Local configuration problem (missing client secret, no home dir).
    #[error("configuration error: {0}")]
    Config(String),
}
