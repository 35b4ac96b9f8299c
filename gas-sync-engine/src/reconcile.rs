//! Reconciliation engine — converge a remote file list onto a local one.
//!
//! The remote protocol only supports whole-document replace, so the edit is
//! computed fully in memory and the caller ships the converged list back in
//! a single call.

use gas_sync_core::types::SourceFile;

/// Counts of the edits one reconciliation pass applied.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EditSummary {
    pub updated: usize,
    pub inserted: usize,
    pub deleted: usize,
}

impl EditSummary {
    /// True when the pass changed nothing (remote was already converged).
    pub fn is_noop(&self) -> bool {
        self.updated == 0 && self.inserted == 0 && self.deleted == 0
    }
}

/// Mutate `remote` so its `(name, kind)` keys and source bodies match
/// `local` exactly.
///
/// - A local file matching a pre-existing remote entry overwrites that
///   entry's `source` in place; position and remote-only metadata are kept.
/// - A local file with no pre-existing match is appended, in local
///   enumeration order.
/// - Every pre-existing remote entry whose key is absent from `local` is
///   removed.
///
/// Lookups only consider the entries that existed before this pass, never
/// files appended during it; a local file can therefore never match an
/// entry inserted for a different local file.
pub fn reconcile_for_push(local: &[SourceFile], remote: &mut Vec<SourceFile>) -> EditSummary {
    let preexisting = remote.len();
    let mut summary = EditSummary::default();

    for file in local {
        match remote[..preexisting]
            .iter()
            .position(|candidate| same_key(candidate, file))
        {
            Some(slot) => {
                remote[slot].source = file.source.clone();
                summary.updated += 1;
            }
            None => {
                remote.push(file.clone());
                summary.inserted += 1;
            }
        }
    }

    let before = remote.len();
    remote.retain(|candidate| local.iter().any(|file| same_key(candidate, file)));
    summary.deleted = before - remote.len();
    summary
}

fn same_key(a: &SourceFile, b: &SourceFile) -> bool {
    a.name == b.name && a.kind == b.kind
}

#[cfg(test)]
mod tests {
    use gas_sync_core::types::FileKind;
    use serde_json::json;

    use super::*;

    fn file(name: &str, kind: FileKind, source: &str) -> SourceFile {
        SourceFile::new(name, kind, source)
    }

    fn keys(files: &[SourceFile]) -> Vec<(String, FileKind)> {
        files.iter().map(|f| (f.name.clone(), f.kind)).collect()
    }

    #[test]
    fn update_insert_delete_in_one_pass() {
        let local = vec![
            file("a", FileKind::ServerJs, "1"),
            file("b", FileKind::Html, "2"),
        ];
        let mut remote = vec![
            file("a", FileKind::ServerJs, "0"),
            file("c", FileKind::ServerJs, "3"),
        ];

        let summary = reconcile_for_push(&local, &mut remote);

        assert_eq!(
            summary,
            EditSummary {
                updated: 1,
                inserted: 1,
                deleted: 1
            }
        );
        assert_eq!(
            keys(&remote),
            vec![
                ("a".to_string(), FileKind::ServerJs),
                ("b".to_string(), FileKind::Html),
            ]
        );
        assert_eq!(remote[0].source, "1");
        assert_eq!(remote[1].source, "2");
    }

    #[test]
    fn second_pass_is_a_noop() {
        let local = vec![
            file("a", FileKind::ServerJs, "1"),
            file("b", FileKind::Html, "2"),
        ];
        let mut remote = vec![file("c", FileKind::ServerJs, "3")];

        reconcile_for_push(&local, &mut remote);
        let converged = remote.clone();
        let summary = reconcile_for_push(&local, &mut remote);

        assert!(summary.is_noop(), "converged remote must yield no edits");
        assert_eq!(remote, converged);
    }

    #[test]
    fn convergence_for_arbitrary_initial_remote() {
        let local = vec![
            file("util", FileKind::ServerJs, "u"),
            file("page", FileKind::Html, "p"),
            file("main", FileKind::ServerJs, "m"),
        ];
        let mut remote = vec![
            file("page", FileKind::Html, "old"),
            file("gone", FileKind::Html, "x"),
            file("main", FileKind::ServerJs, "old"),
            file("other", FileKind::ServerJs, "y"),
        ];

        reconcile_for_push(&local, &mut remote);

        let mut expected = keys(&local);
        expected.sort();
        let mut actual = keys(&remote);
        actual.sort();
        assert_eq!(actual, expected);
        for entry in &remote {
            let origin = local
                .iter()
                .find(|f| f.name == entry.name && f.kind == entry.kind)
                .expect("every surviving entry has a local counterpart");
            assert_eq!(entry.source, origin.source);
        }
    }

    #[test]
    fn same_name_different_kind_are_distinct_entries() {
        let local = vec![
            file("index", FileKind::ServerJs, "js"),
            file("index", FileKind::Html, "html"),
        ];
        let mut remote = vec![file("index", FileKind::ServerJs, "old")];

        let summary = reconcile_for_push(&local, &mut remote);

        assert_eq!(summary.updated, 1);
        assert_eq!(summary.inserted, 1);
        assert_eq!(remote.len(), 2);
    }

    #[test]
    fn empty_local_set_deletes_everything() {
        let mut remote = vec![
            file("a", FileKind::ServerJs, "1"),
            file("b", FileKind::Html, "2"),
        ];
        let summary = reconcile_for_push(&[], &mut remote);
        assert_eq!(summary.deleted, 2);
        assert!(remote.is_empty());
    }

    #[test]
    fn updates_keep_position_inserts_append_in_order() {
        let local = vec![
            file("z", FileKind::ServerJs, "z1"),
            file("a", FileKind::ServerJs, "a1"),
            file("m", FileKind::Html, "m1"),
        ];
        let mut remote = vec![
            file("m", FileKind::Html, "m0"),
            file("z", FileKind::ServerJs, "z0"),
        ];

        reconcile_for_push(&local, &mut remote);

        // m and z keep their original slots; a is appended last.
        assert_eq!(
            keys(&remote),
            vec![
                ("m".to_string(), FileKind::Html),
                ("z".to_string(), FileKind::ServerJs),
                ("a".to_string(), FileKind::ServerJs),
            ]
        );
    }

    #[test]
    fn lookups_ignore_entries_inserted_in_the_same_pass() {
        let local = vec![
            file("dup", FileKind::ServerJs, "first"),
            file("dup", FileKind::ServerJs, "second"),
        ];
        let mut remote = Vec::new();

        let summary = reconcile_for_push(&local, &mut remote);

        // Neither local file may match the other's freshly inserted entry.
        assert_eq!(summary.inserted, 2);
        assert_eq!(remote.len(), 2);
        assert_eq!(remote[0].source, "first");
        assert_eq!(remote[1].source, "second");
    }

    #[test]
    fn update_preserves_remote_only_metadata() {
        let local = vec![file("a", FileKind::ServerJs, "new")];
        let mut entry = file("a", FileKind::ServerJs, "old");
        entry
            .extra
            .insert("id".to_string(), json!("remote-id-17"));
        let mut remote = vec![entry];

        reconcile_for_push(&local, &mut remote);

        assert_eq!(remote[0].source, "new");
        assert_eq!(remote[0].extra.get("id"), Some(&json!("remote-id-17")));
    }
}
