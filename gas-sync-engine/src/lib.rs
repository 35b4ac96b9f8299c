//! # gas-sync-engine
//!
//! Ignore filtering, push/pull reconciliation, and the per-command sync
//! pipelines.
//!
//! Call [`pipeline::push`] / [`pipeline::pull`] / [`pipeline::fetch`] /
//! [`pipeline::add_remote`] with a project directory and a
//! [`gas_sync_core::ScriptGateway`], or the `_blocking` variants from
//! synchronous callers. [`watch::watch`] re-triggers a full push on local
//! file changes.

pub mod error;
pub mod filter;
pub mod pipeline;
pub mod reconcile;
pub mod watch;

pub use error::SyncError;
pub use filter::{IgnoreFilter, IGNORE_FILE};
pub use pipeline::{FetchOutcome, PullFailure, PullReport, PushReport};
pub use reconcile::{reconcile_for_push, EditSummary};
