//! # gas-sync-drive
//!
//! The external collaborators behind the core contracts: an OAuth2
//! credential provider with on-disk token persistence, and the Drive v3
//! transport for script containers.

pub mod auth;
pub mod gateway;

mod error;

pub use auth::Authenticator;
pub use gateway::DriveGateway;
