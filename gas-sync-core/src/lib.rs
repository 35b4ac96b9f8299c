//! Gas-sync core library — domain types, project state store, gateway
//! contracts, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and domain structs
//! - [`error`] — [`ProjectError`] and [`GatewayError`]
//! - [`project`] — open / init / save of the `.gas-sync.json` state file
//! - [`gateway`] — the [`ScriptGateway`] and [`CredentialProvider`] contracts

pub mod error;
pub mod gateway;
pub mod project;
pub mod types;

pub use error::{GatewayError, ProjectError};
pub use gateway::{AuthHandle, CredentialProvider, ScriptGateway};
pub use types::{
    Alias, FileId, FileKind, Project, RemoteDescriptor, RemoteName, ScriptBundle, SourceFile,
};
