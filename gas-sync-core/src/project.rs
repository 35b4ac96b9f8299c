//! Project state store — the persisted `.gas-sync.json` record.
//!
//! # Storage layout
//!
//! ```text
//! <project dir>/
//!   .gas-sync.json   (state file — single top-level "remotes" map)
//!   .gitignore       (gains a ".gas-sync.json" entry on first init)
//! ```
//!
//! Saves use a `.tmp` sibling + rename so a crashed write never leaves a
//! truncated state file behind.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::ProjectError;
use crate::types::Project;

/// Name of the state file inside a project directory.
pub const STATE_FILE: &str = ".gas-sync.json";

/// `<dir>/.gas-sync.json` — pure, no I/O.
pub fn state_path(dir: &Path) -> PathBuf {
    dir.join(STATE_FILE)
}

/// Open a directory as a gas-sync project.
///
/// Returns `ProjectError::NotAProject` if the state file is absent,
/// `ProjectError::Parse` (with path context) if it is not valid state JSON.
pub fn open(dir: &Path) -> Result<Project, ProjectError> {
    let path = state_path(dir);
    if !path.exists() {
        return Err(ProjectError::NotAProject { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_json::from_str(&contents).map_err(|source| ProjectError::Parse { path, source })
}

/// Initialize a directory as a gas-sync project.
///
/// Idempotent: if a state file already exists the project is opened and
/// returned unchanged. On first init an empty remote map is written and the
/// state file is excluded from version tracking via `.gitignore`.
pub fn init(dir: &Path) -> Result<Project, ProjectError> {
    if state_path(dir).exists() {
        return open(dir);
    }
    let project = Project::default();
    save(dir, &project)?;
    track_state_file_exclusion(dir)?;
    Ok(project)
}

/// Serialize the full project back to the state file, overwriting it.
///
/// Write flow: serialize → `.tmp` sibling → `rename`.
pub fn save(dir: &Path, project: &Project) -> Result<(), ProjectError> {
    let path = state_path(dir);
    let tmp = path.with_file_name(format!("{STATE_FILE}.tmp"));
    let json = serde_json::to_string_pretty(project)?;
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, &path)?;
    Ok(())
}

/// Append a `.gas-sync.json` entry to `<dir>/.gitignore` unless one is
/// already present, creating the file if needed.
fn track_state_file_exclusion(dir: &Path) -> Result<(), ProjectError> {
    let path = dir.join(".gitignore");
    let existing = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => String::new(),
        Err(err) => return Err(err.into()),
    };
    if existing.lines().any(|line| line.trim() == STATE_FILE) {
        return Ok(());
    }
    let mut updated = existing;
    if !updated.is_empty() && !updated.ends_with('\n') {
        updated.push('\n');
    }
    updated.push_str(STATE_FILE);
    updated.push('\n');
    std::fs::write(&path, updated)?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
