//! Ignore filter — decides which local files participate in a sync.
//!
//! A file is eligible only if its extension maps to a recognized
//! [`FileKind`] AND its bare filename matches no pattern from the project's
//! `.gasignore` (one shell glob per line, no negation). An absent pattern
//! file means only the extension check applies.

use std::io::ErrorKind;
use std::path::Path;

use glob::Pattern;

use gas_sync_core::types::FileKind;

/// Name of the optional pattern file inside a project directory.
pub const IGNORE_FILE: &str = ".gasignore";

#[derive(Debug, Default, Clone)]
pub struct IgnoreFilter {
    patterns: Vec<Pattern>,
}

impl IgnoreFilter {
    /// Parse newline-delimited glob patterns. Blank lines are skipped;
    /// unparsable patterns are skipped with a warning.
    pub fn parse(text: &str) -> Self {
        let mut patterns = Vec::new();
        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            match Pattern::new(line) {
                Ok(pattern) => patterns.push(pattern),
                Err(err) => log::warn!("skipping invalid ignore pattern '{line}': {err}"),
            }
        }
        Self { patterns }
    }

    /// Load `<dir>/.gasignore`; an absent file yields an empty pattern set.
    pub fn load(dir: &Path) -> std::io::Result<Self> {
        match std::fs::read_to_string(dir.join(IGNORE_FILE)) {
            Ok(text) => Ok(Self::parse(&text)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(err),
        }
    }

    /// Whether any pattern matches the bare filename.
    pub fn is_ignored(&self, filename: &str) -> bool {
        self.patterns.iter().any(|pattern| pattern.matches(filename))
    }

    /// `Some(kind)` iff the filename has a recognized extension and is not
    /// matched by any ignore pattern.
    pub fn eligible(&self, filename: &str) -> Option<FileKind> {
        let (_, kind) = FileKind::match_filename(filename)?;
        if self.is_ignored(filename) {
            return None;
        }
        Some(kind)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use tempfile::TempDir;

    use super::*;

    #[rstest]
    #[case("foo.test.js", None)]
    #[case("foo.js", Some(FileKind::ServerJs))]
    #[case("index.html", Some(FileKind::Html))]
    #[case("notes.txt", None)]
    fn suffix_pattern_excludes_matching_files(
        #[case] filename: &str,
        #[case] expected: Option<FileKind>,
    ) {
        let filter = IgnoreFilter::parse("*.test.js\n");
        assert_eq!(filter.eligible(filename), expected);
    }

    #[test]
    fn extension_mismatch_is_ineligible_without_patterns() {
        let filter = IgnoreFilter::default();
        assert_eq!(filter.eligible("notes.txt"), None);
        assert_eq!(filter.eligible("Makefile"), None);
        assert_eq!(filter.eligible("main.js"), Some(FileKind::ServerJs));
    }

    #[rstest]
    #[case("ve?dor.js", "vendor.js", true)]
    #[case("[ab]*.js", "a_lib.js", true)]
    #[case("[ab]*.js", "c_lib.js", false)]
    fn glob_metacharacters(#[case] pattern: &str, #[case] filename: &str, #[case] ignored: bool) {
        let filter = IgnoreFilter::parse(pattern);
        assert_eq!(filter.is_ignored(filename), ignored);
    }

    #[test]
    fn matching_is_against_bare_filename() {
        let filter = IgnoreFilter::parse("build/*\n");
        // The candidate is always a bare filename; a path-shaped pattern
        // therefore never matches.
        assert_eq!(filter.eligible("output.js"), Some(FileKind::ServerJs));
    }

    #[test]
    fn blank_and_crlf_lines_are_skipped() {
        let filter = IgnoreFilter::parse("\r\n*.min.js\r\n\n");
        assert!(filter.is_ignored("app.min.js"));
        assert!(!filter.is_ignored("app.js"));
    }

    #[test]
    fn invalid_pattern_is_skipped_not_fatal() {
        let filter = IgnoreFilter::parse("[unclosed\n*.min.js\n");
        assert!(filter.is_ignored("app.min.js"));
        assert_eq!(filter.eligible("main.js"), Some(FileKind::ServerJs));
    }

    #[test]
    fn load_absent_file_yields_empty_set() {
        let dir = TempDir::new().expect("tempdir");
        let filter = IgnoreFilter::load(dir.path()).expect("load");
        assert_eq!(filter.eligible("main.js"), Some(FileKind::ServerJs));
    }

    #[test]
    fn load_reads_project_pattern_file() {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join(IGNORE_FILE), "secret*.js\n").expect("write");
        let filter = IgnoreFilter::load(dir.path()).expect("load");
        assert_eq!(filter.eligible("secrets.js"), None);
        assert_eq!(filter.eligible("main.js"), Some(FileKind::ServerJs));
    }
}
