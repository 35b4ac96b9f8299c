//! Contracts for the external collaborators: the remote script gateway and
//! the credential provider that authenticates it.
//!
//! The sync pipelines consume these as `Arc<dyn ScriptGateway>`; tests plug
//! in in-memory fakes.

use std::fmt;

use chrono::{DateTime, Utc};

use crate::error::GatewayError;
use crate::types::{Alias, FileId, ScriptBundle};

/// Opaque bearer capability returned by a credential provider.
#[derive(Clone)]
pub struct AuthHandle(String);

impl AuthHandle {
    pub fn new(bearer: impl Into<String>) -> Self {
        Self(bearer.into())
    }

    pub fn bearer(&self) -> &str {
        &self.0
    }
}

// Never print the token itself.
impl fmt::Debug for AuthHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthHandle(..)")
    }
}

/// Resolves an alias to an authenticated handle.
///
/// Implementations cache resolved handles per alias for the life of the
/// process, so resolution happens once per alias per run.
pub trait CredentialProvider: Send + Sync {
    fn resolve(&self, alias: &Alias) -> Result<AuthHandle, GatewayError>;
}

/// The three operations the cloud document store exposes for a script
/// container. Calls are blocking; callers run them on a blocking pool when
/// they need concurrency.
pub trait ScriptGateway: Send + Sync {
    /// Export the container's complete file list.
    fn export_files(&self, alias: &Alias, file_id: &FileId) -> Result<ScriptBundle, GatewayError>;

    /// Fetch the container's last-modified timestamp.
    fn modified_time(
        &self,
        alias: &Alias,
        file_id: &FileId,
    ) -> Result<DateTime<Utc>, GatewayError>;

    /// Replace the container's file list wholesale. There is no partial
    /// update primitive; the bundle must already be fully converged.
    fn replace_files(
        &self,
        alias: &Alias,
        file_id: &FileId,
        bundle: &ScriptBundle,
    ) -> Result<(), GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_handle_debug_redacts_token() {
        let handle = AuthHandle::new("ya29.secret-token");
        assert_eq!(format!("{handle:?}"), "AuthHandle(..)");
        assert_eq!(handle.bearer(), "ya29.secret-token");
    }
}
