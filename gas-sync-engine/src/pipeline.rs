//! Per-command sync pipelines: push, pull, fetch, add-remote.
//!
//! Each pipeline is one linear run over a project directory. Gateway calls
//! are blocking, so anything that may run concurrently (local reads vs. the
//! remote export, per-file pull writes, per-remote metadata requests) is
//! fanned out on the blocking pool and joined before state is mutated.
//!
//! The `_blocking` variants build a runtime and drive the async pipeline to
//! completion, so synchronous callers need no runtime of their own.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use tokio::task::JoinSet;

use gas_sync_core::project;
use gas_sync_core::types::{Alias, FileId, RemoteDescriptor, RemoteName, SourceFile};
use gas_sync_core::{GatewayError, ProjectError, ScriptGateway};

use crate::error::{io_err, task_err, SyncError};
use crate::filter::IgnoreFilter;
use crate::reconcile::{reconcile_for_push, EditSummary};

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Outcome of a completed push.
#[derive(Debug, Clone)]
pub struct PushReport {
    pub remote: RemoteName,
    pub edits: EditSummary,
    /// Number of files the remote container holds after convergence.
    pub remote_files: usize,
}

/// A single failed local write during a pull.
#[derive(Debug)]
pub struct PullFailure {
    pub path: PathBuf,
    pub message: String,
}

/// Outcome of a completed pull. Failures are collected per file; the
/// presence of failures does not mean the pull as a whole failed.
#[derive(Debug)]
pub struct PullReport {
    pub remote: RemoteName,
    pub written: Vec<PathBuf>,
    pub failures: Vec<PullFailure>,
}

/// Post-refresh snapshot of one remote after a fetch. `error` is set when
/// the metadata request for this remote failed; its descriptor is then the
/// unchanged pre-fetch state.
#[derive(Debug)]
pub struct FetchOutcome {
    pub descriptor: RemoteDescriptor,
    pub error: Option<GatewayError>,
}

// ---------------------------------------------------------------------------
// Push
// ---------------------------------------------------------------------------

/// Converge the remote container onto the local eligible file set.
///
/// Local reads and the remote export run concurrently; reconciliation waits
/// for both. Any failure before the single write-back aborts the whole push
/// with the remote untouched. On success the descriptor timestamps are
/// refreshed and persisted.
pub async fn push(
    dir: &Path,
    remote: &RemoteName,
    gateway: Arc<dyn ScriptGateway>,
) -> Result<PushReport, SyncError> {
    let mut project = project::open(dir)?;
    let descriptor = project.remote(remote)?.clone();

    let filter = IgnoreFilter::load(dir).map_err(|e| io_err(dir.join(crate::IGNORE_FILE), e))?;

    let read_dir = dir.to_path_buf();
    let local_task = tokio::task::spawn_blocking(move || read_local_files(&read_dir, &filter));

    let export_gateway = gateway.clone();
    let export_alias = descriptor.alias.clone();
    let export_id = descriptor.file_id.clone();
    let export_task =
        tokio::task::spawn_blocking(move || export_gateway.export_files(&export_alias, &export_id));

    let (local, bundle) = tokio::join!(local_task, export_task);
    let local = local.map_err(task_err)??;
    let mut bundle = bundle.map_err(task_err)??;

    let edits = reconcile_for_push(&local, &mut bundle.files);
    let remote_files = bundle.files.len();

    let alias = descriptor.alias.clone();
    let file_id = descriptor.file_id.clone();
    tokio::task::spawn_blocking(move || gateway.replace_files(&alias, &file_id, &bundle))
        .await
        .map_err(task_err)??;

    let now = Utc::now();
    let entry = project.remote_mut(remote)?;
    entry.last_modified = now;
    entry.last_fetch = now;
    project::save(dir, &project)?;

    log::info!(
        "pushed '{remote}': {} updated, {} added, {} removed ({remote_files} remote files)",
        edits.updated,
        edits.inserted,
        edits.deleted,
    );
    Ok(PushReport {
        remote: remote.clone(),
        edits,
        remote_files,
    })
}

/// Enumerate the directory, apply the ignore filter, and read every
/// eligible file. A single failed read fails the whole snapshot — a push
/// must never fire with a partial local set.
fn read_local_files(dir: &Path, filter: &IgnoreFilter) -> Result<Vec<SourceFile>, SyncError> {
    let mut filenames = Vec::new();
    for entry in std::fs::read_dir(dir).map_err(|e| io_err(dir, e))? {
        let entry = entry.map_err(|e| io_err(dir, e))?;
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            filenames.push(name.to_owned());
        }
    }
    // read_dir order is platform-defined; sort for a deterministic snapshot.
    filenames.sort();

    let mut files = Vec::new();
    for filename in filenames {
        let Some(kind) = filter.eligible(&filename) else {
            continue;
        };
        let path = dir.join(&filename);
        let source = std::fs::read_to_string(&path).map_err(|e| io_err(&path, e))?;
        let stem = filename.strip_suffix(kind.extension()).unwrap_or(&filename);
        files.push(SourceFile::new(stem, kind, source));
    }
    Ok(files)
}

// ---------------------------------------------------------------------------
// Pull
// ---------------------------------------------------------------------------

/// Materialize the remote container onto local disk, overwriting local
/// files unconditionally.
///
/// Writes are fanned out with no dependency between them; one failure never
/// blocks a sibling. The report is produced only after every write settles.
pub async fn pull(
    dir: &Path,
    remote: &RemoteName,
    gateway: Arc<dyn ScriptGateway>,
) -> Result<PullReport, SyncError> {
    let mut project = project::open(dir)?;
    let descriptor = project.remote(remote)?.clone();

    let alias = descriptor.alias.clone();
    let file_id = descriptor.file_id.clone();
    let bundle = tokio::task::spawn_blocking(move || gateway.export_files(&alias, &file_id))
        .await
        .map_err(task_err)??;

    let mut writes = JoinSet::new();
    for file in bundle.files {
        let target = dir.join(file.filename());
        writes.spawn_blocking(move || match std::fs::write(&target, file.source.as_bytes()) {
            Ok(()) => Ok(target),
            Err(err) => Err((target, err)),
        });
    }

    let mut written = Vec::new();
    let mut failures = Vec::new();
    while let Some(joined) = writes.join_next().await {
        match joined.map_err(task_err)? {
            Ok(path) => written.push(path),
            Err((path, err)) => {
                log::warn!("failed to write {}: {err}", path.display());
                failures.push(PullFailure {
                    path,
                    message: err.to_string(),
                });
            }
        }
    }
    written.sort();
    failures.sort_by(|a, b| a.path.cmp(&b.path));

    let entry = project.remote_mut(remote)?;
    entry.last_fetch = Utc::now();
    project::save(dir, &project)?;

    Ok(PullReport {
        remote: remote.clone(),
        written,
        failures,
    })
}

// ---------------------------------------------------------------------------
// Fetch
// ---------------------------------------------------------------------------

/// Refresh metadata for every remote concurrently.
///
/// Per-remote failures are reported in the outcome list and leave that
/// descriptor untouched; the project is persisted once after all requests
/// settle, carrying whatever timestamps were successfully refreshed.
pub async fn fetch(
    dir: &Path,
    gateway: Arc<dyn ScriptGateway>,
) -> Result<Vec<FetchOutcome>, SyncError> {
    let mut project = project::open(dir)?;

    let mut requests = JoinSet::new();
    for descriptor in project.remotes.values().cloned() {
        let gateway = gateway.clone();
        requests.spawn_blocking(move || {
            let result = gateway.modified_time(&descriptor.alias, &descriptor.file_id);
            (descriptor, result)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = requests.join_next().await {
        let (descriptor, result) = joined.map_err(task_err)?;
        match result {
            Ok(modified) => {
                let entry = project.remote_mut(&descriptor.name)?;
                entry.last_modified = modified;
                entry.last_fetch = Utc::now();
                outcomes.push(FetchOutcome {
                    descriptor: entry.clone(),
                    error: None,
                });
            }
            Err(err) => {
                log::warn!("failed to refresh '{}': {err}", descriptor.name);
                outcomes.push(FetchOutcome {
                    descriptor,
                    error: Some(err),
                });
            }
        }
    }

    project::save(dir, &project)?;
    outcomes.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));
    Ok(outcomes)
}

// ---------------------------------------------------------------------------
// Add remote
// ---------------------------------------------------------------------------

/// Bind a remote container to this project.
///
/// The metadata fetch runs first; if it fails the project state is left
/// untouched. On success the descriptor is inserted (keyed by name, with a
/// fresh `last_fetch`) and persisted before returning.
pub async fn add_remote(
    dir: &Path,
    gateway: Arc<dyn ScriptGateway>,
    alias: Alias,
    file_id: FileId,
    name: RemoteName,
    force: bool,
) -> Result<RemoteDescriptor, SyncError> {
    let mut project = project::open(dir)?;
    if project.remotes.contains_key(&name) && !force {
        return Err(ProjectError::RemoteExists { name }.into());
    }

    let meta_gateway = gateway.clone();
    let meta_alias = alias.clone();
    let meta_id = file_id.clone();
    let modified =
        tokio::task::spawn_blocking(move || meta_gateway.modified_time(&meta_alias, &meta_id))
            .await
            .map_err(task_err)??;

    let descriptor = RemoteDescriptor {
        name: name.clone(),
        file_id,
        alias,
        last_modified: modified,
        last_fetch: Utc::now(),
    };
    project.insert_remote(descriptor.clone());
    project::save(dir, &project)?;
    Ok(descriptor)
}

// ---------------------------------------------------------------------------
// Blocking entry points
// ---------------------------------------------------------------------------

fn runtime() -> Result<tokio::runtime::Runtime, SyncError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| SyncError::Task(format!("failed to start runtime: {err}")))
}

pub fn push_blocking(
    dir: &Path,
    remote: &RemoteName,
    gateway: Arc<dyn ScriptGateway>,
) -> Result<PushReport, SyncError> {
    runtime()?.block_on(push(dir, remote, gateway))
}

pub fn pull_blocking(
    dir: &Path,
    remote: &RemoteName,
    gateway: Arc<dyn ScriptGateway>,
) -> Result<PullReport, SyncError> {
    runtime()?.block_on(pull(dir, remote, gateway))
}

pub fn fetch_blocking(
    dir: &Path,
    gateway: Arc<dyn ScriptGateway>,
) -> Result<Vec<FetchOutcome>, SyncError> {
    runtime()?.block_on(fetch(dir, gateway))
}

pub fn add_remote_blocking(
    dir: &Path,
    gateway: Arc<dyn ScriptGateway>,
    alias: Alias,
    file_id: FileId,
    name: RemoteName,
    force: bool,
) -> Result<RemoteDescriptor, SyncError> {
    runtime()?.block_on(add_remote(dir, gateway, alias, file_id, name, force))
}

// ---------------------------------------------------------------------------
// Unit tests (pipeline integration tests live in tests/)
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn read_local_files_sorts_and_filters() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("zeta.js"), "z").expect("write");
        std::fs::write(dir.path().join("alpha.js"), "a").expect("write");
        std::fs::write(dir.path().join("page.html"), "<p/>").expect("write");
        std::fs::write(dir.path().join("notes.txt"), "skip").expect("write");
        std::fs::create_dir(dir.path().join("nested.js")).expect("mkdir");

        let files = read_local_files(dir.path(), &IgnoreFilter::default()).expect("read");
        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "page", "zeta"]);
    }

    #[test]
    fn read_local_files_fails_fast_on_unreadable_entry() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("ok.js"), "fine").expect("write");
        std::fs::write(dir.path().join("binary.js"), [0xff, 0xfe, 0x00, 0x80]).expect("write");

        let err = read_local_files(dir.path(), &IgnoreFilter::default()).unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }
}
