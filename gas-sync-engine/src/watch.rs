//! Watch mode — re-trigger a full push when eligible local files change.
//!
//! One watcher on the project directory (non-recursive), a debounce window
//! so editor save bursts collapse into a single push, and pushes awaited
//! inline so a second push can never start while one is in flight.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use notify::{recommended_watcher, Event, EventKind, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::time::Instant;

use gas_sync_core::types::{FileKind, RemoteName};
use gas_sync_core::ScriptGateway;

use crate::error::SyncError;
use crate::pipeline::push;

/// Window within which change events collapse into one push trigger.
pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(750);

/// Global debounce: every trigger pushes the whole directory, so there is a
/// single window rather than one per path.
#[derive(Debug)]
pub struct Debouncer {
    window: Duration,
    last: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self { window, last: None }
    }

    /// True when enough time has passed since the last accepted trigger.
    pub fn should_fire(&mut self, now: Instant) -> bool {
        match self.last {
            Some(previous) if now.duration_since(previous) < self.window => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }
}

/// Watch `dir` and push to `remote` on every (debounced) eligible change.
/// Runs until ctrl-c.
pub async fn watch(
    dir: &Path,
    remote: &RemoteName,
    gateway: Arc<dyn ScriptGateway>,
) -> Result<(), SyncError> {
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();
    let mut watcher = recommended_watcher(move |event| {
        let _ = event_tx.send(event);
    })?;
    watcher.watch(dir, RecursiveMode::NonRecursive)?;
    log::info!("watching {} for changes to push to '{remote}'", dir.display());

    let mut debounce = Debouncer::new(DEBOUNCE_WINDOW);
    loop {
        tokio::select! {
            signal = tokio::signal::ctrl_c() => {
                signal.map_err(|err| SyncError::Task(format!("signal handler failed: {err}")))?;
                log::info!("stopping watch for '{remote}'");
                break;
            }
            event = event_rx.recv() => {
                let Some(event) = event else { break };
                let event = match event {
                    Ok(event) => event,
                    Err(err) => {
                        log::warn!("watcher event error: {err}");
                        continue;
                    }
                };
                if !is_push_trigger(&event) {
                    continue;
                }
                if !debounce.should_fire(Instant::now()) {
                    continue;
                }

                let timestamp = chrono::Utc::now().format("%H:%M:%S");
                match push(dir, remote, gateway.clone()).await {
                    Ok(report) => println!(
                        "[{timestamp}] pushed '{}' ({} updated, {} added, {} removed)",
                        report.remote,
                        report.edits.updated,
                        report.edits.inserted,
                        report.edits.deleted,
                    ),
                    Err(err) => eprintln!("[{timestamp}] push to '{remote}' failed: {err}"),
                }
            }
        }
    }

    Ok(())
}

/// Blocking entry point for synchronous callers.
pub fn watch_blocking(
    dir: &Path,
    remote: &RemoteName,
    gateway: Arc<dyn ScriptGateway>,
) -> Result<(), SyncError> {
    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|err| SyncError::Task(format!("failed to start runtime: {err}")))?
        .block_on(watch(dir, remote, gateway))
}

/// A change is worth a push when it creates, modifies, or removes a file
/// whose name carries a recognized extension. The push itself re-applies
/// the full ignore filter; this is only the cheap trigger check.
fn is_push_trigger(event: &Event) -> bool {
    if !matches!(
        event.kind,
        EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_)
    ) {
        return false;
    }
    event.paths.iter().any(|path| {
        path.file_name()
            .and_then(|name| name.to_str())
            .and_then(FileKind::match_filename)
            .is_some()
    })
}
