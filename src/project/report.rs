//! Run report: file errors, diffs and file operations of one run.

use std::path::{Path, PathBuf};

use similar::TextDiff;
use smol_str::SmolStr;

use super::errors::{FileErrorKind, ProcessError};
use super::phase::Phase;
use crate::base::FileId;

// ============================================================================
// FILE ERRORS
// ============================================================================

/// A failure recorded against one file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileError {
    pub path: PathBuf,
    pub phase: Phase,
    pub message: String,
    pub kind: FileErrorKind,
}

impl FileError {
    pub fn new(path: &Path, phase: Phase, error: &ProcessError) -> Self {
        Self {
            path: path.to_owned(),
            phase,
            message: error.to_string(),
            kind: error.kind(),
        }
    }
}

// ============================================================================
// DIFFS
// ============================================================================

/// Original and rendered contents of one emitted file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileDiff {
    pub file: FileId,
    pub path: PathBuf,
    pub old: String,
    pub new: String,
    /// Ids of the rules that changed the file, in application order.
    pub applied_rules: Vec<SmolStr>,
}

impl FileDiff {
    pub fn is_changed(&self) -> bool {
        self.old != self.new
    }

    /// Unified diff of the file; empty when nothing changed.
    pub fn unified_diff(&self, context: usize) -> String {
        if !self.is_changed() {
            return String::new();
        }
        let path = self.path.display().to_string();
        TextDiff::from_lines(&self.old, &self.new)
            .unified_diff()
            .context_radius(context)
            .header(&format!("a/{path}"), &format!("b/{path}"))
            .to_string()
    }
}

// ============================================================================
// FILE OPERATIONS
// ============================================================================

/// A file operation queued by a rule, applied after all diffs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FileChange {
    Add { path: PathBuf, contents: String },
    Move { from: PathBuf, to: PathBuf },
    Remove { path: PathBuf },
}

impl FileChange {
    /// Additions first, then moves, then removals.
    pub(crate) fn apply_order(&self) -> u8 {
        match self {
            FileChange::Add { .. } => 0,
            FileChange::Move { .. } => 1,
            FileChange::Remove { .. } => 2,
        }
    }

    /// The path the change is reported against.
    pub fn path(&self) -> &Path {
        match self {
            FileChange::Add { path, .. } | FileChange::Remove { path } => path,
            FileChange::Move { from, .. } => from,
        }
    }
}

/// A queued file operation and whether it reached the file system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReconciledChange {
    pub change: FileChange,
    /// False in diff-only mode and when applying the change failed.
    pub applied: bool,
}

// ============================================================================
// REPORT
// ============================================================================

/// Everything a run produced.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    errors: Vec<FileError>,
    diffs: Vec<FileDiff>,
    changes: Vec<ReconciledChange>,
    /// Unified diffs rendered in diff-only mode, keyed like `diffs`.
    rendered: Vec<(FileId, String)>,
}

impl RunReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_error(&mut self, error: FileError) {
        self.errors.push(error);
    }

    pub fn add_diff(&mut self, diff: FileDiff) {
        self.diffs.push(diff);
    }

    pub fn add_rendered_diff(&mut self, file: FileId, diff: String) {
        self.rendered.push((file, diff));
    }

    pub fn add_change(&mut self, change: FileChange, applied: bool) {
        self.changes.push(ReconciledChange { change, applied });
    }

    /// Recorded errors in the order they happened.
    pub fn errors(&self) -> &[FileError] {
        &self.errors
    }

    pub fn errors_for_path(&self, path: &Path) -> Vec<&FileError> {
        self.errors.iter().filter(|e| e.path == path).collect()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// True when no user-visible error was recorded.
    pub fn is_success(&self) -> bool {
        !self.has_errors()
    }

    /// Every emitted file, changed or not, in input order.
    pub fn diffs(&self) -> &[FileDiff] {
        &self.diffs
    }

    /// Emitted files whose contents changed.
    pub fn changed_diffs(&self) -> impl Iterator<Item = &FileDiff> {
        self.diffs.iter().filter(|d| d.is_changed())
    }

    pub fn diff_for(&self, path: &Path) -> Option<&FileDiff> {
        self.diffs.iter().find(|d| d.path == path)
    }

    /// Unified diffs rendered in diff-only mode.
    pub fn rendered_diffs(&self) -> impl Iterator<Item = &str> {
        self.rendered.iter().map(|(_, diff)| diff.as_str())
    }

    /// Queued file operations, in the order they were applied.
    pub fn changes(&self) -> &[ReconciledChange] {
        &self.changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn diff(old: &str, new: &str) -> FileDiff {
        FileDiff {
            file: FileId::new(0),
            path: PathBuf::from("src/A.php"),
            old: old.to_string(),
            new: new.to_string(),
            applied_rules: Vec::new(),
        }
    }

    #[test]
    fn test_unified_diff_headers_and_hunks() {
        let rendered = diff("a\nb\nc\n", "a\nB\nc\n").unified_diff(3);
        assert!(rendered.starts_with("--- a/src/A.php\n+++ b/src/A.php\n"));
        assert!(rendered.contains("-b\n"));
        assert!(rendered.contains("+B\n"));
    }

    #[test]
    fn test_unchanged_file_has_empty_diff() {
        let same = diff("a\n", "a\n");
        assert!(!same.is_changed());
        assert_eq!(same.unified_diff(3), "");
    }

    #[test]
    fn test_report_success_tracks_errors() {
        let mut report = RunReport::new();
        report.add_diff(diff("a\n", "a\n"));
        assert!(report.is_success());
        assert_eq!(report.changed_diffs().count(), 0);

        let error = ProcessError::failed("printer crashed");
        report.add_error(FileError::new(Path::new("src/A.php"), Phase::Emitting, &error));

        assert!(!report.is_success());
        assert_eq!(report.errors_for_path(Path::new("src/A.php")).len(), 1);
        assert_eq!(report.errors()[0].kind, FileErrorKind::Failure);
    }

    #[test]
    fn test_file_changes_apply_in_order() {
        let mut changes = vec![
            FileChange::Remove { path: "c".into() },
            FileChange::Move { from: "b".into(), to: "d".into() },
            FileChange::Add { path: "a".into(), contents: String::new() },
        ];
        changes.sort_by_key(FileChange::apply_order);

        let paths: Vec<_> = changes.iter().map(|c| c.path().to_path_buf()).collect();
        assert_eq!(paths, vec![PathBuf::from("a"), PathBuf::from("b"), PathBuf::from("c")]);
    }
}
