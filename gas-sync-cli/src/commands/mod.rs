//! Subcommand implementations.

pub mod authorize;
pub mod fetch;
pub mod init;
pub mod pull;
pub mod push;
pub mod remote;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};

use gas_sync_core::ScriptGateway;
use gas_sync_drive::{Authenticator, DriveGateway};

/// The project directory every command operates on.
pub(crate) fn project_dir() -> Result<PathBuf> {
    std::env::current_dir().context("cannot determine current directory")
}

/// Build the Drive gateway over the user's stored credentials.
pub(crate) fn drive_gateway() -> Result<Arc<dyn ScriptGateway>> {
    let auth = Authenticator::open().context("credential store unavailable")?;
    Ok(Arc::new(DriveGateway::new(Arc::new(auth))))
}
