//! Domain types for gas-sync projects and script containers.
//!
//! All types serialize via serde + serde_json; the on-disk state schema is
//! documented on [`Project`] and [`RemoteDescriptor`].

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed, user-chosen name for a remote binding ("origin", …).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RemoteName(pub String);

impl fmt::Display for RemoteName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for RemoteName {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for RemoteName {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Opaque identifier of a remote script container. Immutable once bound.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for FileId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for FileId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A label identifying one set of stored credentials.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Alias(pub String);

impl fmt::Display for Alias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for Alias {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Alias {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Source files
// ---------------------------------------------------------------------------

/// The two recognized source kinds inside a script container.
///
/// Wire names (`server_js`, `html`) follow the container export format; the
/// local extensions are `.js` and `.html`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileKind {
    ServerJs,
    Html,
}

impl FileKind {
    /// Local filename extension for this kind, including the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            FileKind::ServerJs => ".js",
            FileKind::Html => ".html",
        }
    }

    /// Map a bare extension (no dot) to a kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "js" => Some(FileKind::ServerJs),
            "html" => Some(FileKind::Html),
            _ => None,
        }
    }

    /// Split `name.ext` into `(stem, kind)` when the extension is recognized.
    pub fn match_filename(filename: &str) -> Option<(&str, Self)> {
        let (stem, ext) = filename.rsplit_once('.')?;
        if stem.is_empty() {
            return None;
        }
        Some((stem, Self::from_extension(ext)?))
    }
}

impl fmt::Display for FileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileKind::ServerJs => write!(f, "server_js"),
            FileKind::Html => write!(f, "html"),
        }
    }
}

/// One named, typed source file — the in-memory form shared by the local
/// snapshot and the remote container listing.
///
/// `extra` carries any remote-only fields the export returns; it is
/// round-tripped untouched when a file is updated in place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FileKind,
    pub source: String,
    #[serde(flatten, default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, kind: FileKind, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind,
            source: source.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Local filename this file materializes to (`<name><ext>`).
    pub fn filename(&self) -> String {
        format!("{}{}", self.name, self.kind.extension())
    }
}

/// A whole exported script container document.
///
/// The replace call posts this entire object back; unknown top-level fields
/// round-trip through `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptBundle {
    #[serde(default)]
    pub files: Vec<SourceFile>,
    #[serde(flatten, default, skip_serializing_if = "serde_json::Map::is_empty")]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl ScriptBundle {
    pub fn new(files: Vec<SourceFile>) -> Self {
        Self {
            files,
            extra: serde_json::Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Project state
// ---------------------------------------------------------------------------

/// One remote script container binding.
///
/// `file_id` and `alias` fully determine how to reach the remote; they are
/// set when the remote is added and never silently changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDescriptor {
    pub name: RemoteName,
    pub file_id: FileId,
    pub alias: Alias,
    /// Last modification timestamp observed from the remote.
    pub last_modified: DateTime<Utc>,
    /// Timestamp of the last successful round trip to the remote.
    pub last_fetch: DateTime<Utc>,
}

/// Root of the persisted project state (`.gas-sync.json`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Project {
    #[serde(default)]
    pub remotes: BTreeMap<RemoteName, RemoteDescriptor>,
}

impl Project {
    /// Look up a remote by name.
    pub fn remote(&self, name: &RemoteName) -> Result<&RemoteDescriptor, crate::ProjectError> {
        self.remotes
            .get(name)
            .ok_or_else(|| crate::ProjectError::NoSuchRemote { name: name.clone() })
    }

    /// Mutable lookup, same failure contract as [`Project::remote`].
    pub fn remote_mut(
        &mut self,
        name: &RemoteName,
    ) -> Result<&mut RemoteDescriptor, crate::ProjectError> {
        self.remotes
            .get_mut(name)
            .ok_or_else(|| crate::ProjectError::NoSuchRemote { name: name.clone() })
    }

    /// Insert (or replace) a remote binding keyed by its name.
    pub fn insert_remote(&mut self, descriptor: RemoteDescriptor) {
        self.remotes.insert(descriptor.name.clone(), descriptor);
    }

    /// Remove a remote binding; fails if the name is unknown.
    pub fn remove_remote(
        &mut self,
        name: &RemoteName,
    ) -> Result<RemoteDescriptor, crate::ProjectError> {
        self.remotes
            .remove(name)
            .ok_or_else(|| crate::ProjectError::NoSuchRemote { name: name.clone() })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
