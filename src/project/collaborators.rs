//! Collaborators plugged into the pipeline: parser, rules, printer and
//! progress observer.

use std::path::{Path, PathBuf};

use super::errors::ProcessError;
use super::phase::Phase;
use super::report::FileChange;
use crate::base::FileId;
use crate::hir::SymbolIndex;
use crate::syntax::SourceTree;

/// Turns source text into a tree.
///
/// Called from the rayon pool when parallel parsing is on.
pub trait Parser: Send + Sync {
    /// Parse one file. The pipeline stamps the returned tree with the file's
    /// [`FileId`].
    fn parse(&self, path: &Path, content: &str) -> Result<SourceTree, ProcessError>;
}

/// A rewrite rule.
pub trait Rule {
    /// Stable identifier, used by `only_rule` and in reports.
    fn id(&self) -> &str;

    /// Rewrite `tree` in place. Returns whether anything changed.
    fn refactor(&self, tree: &mut SourceTree, ctx: &mut RuleContext<'_>)
    -> Result<bool, ProcessError>;
}

/// Turns a tree back into source text.
pub trait Printer {
    fn render(&self, tree: &SourceTree) -> Result<String, ProcessError>;
}

/// Receives a callback for every file in every phase.
pub trait ProgressObserver {
    fn on_file(&self, phase: Phase, path: &Path);
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_file(&self, _: Phase, _: &Path) {}
}

/// What a rule sees while rewriting one file.
///
/// File operations are queued here and applied once every file has been
/// emitted.
pub struct RuleContext<'a> {
    index: &'a SymbolIndex,
    file: FileId,
    path: &'a Path,
    queued: &'a mut Vec<FileChange>,
}

impl<'a> RuleContext<'a> {
    pub(crate) fn new(
        index: &'a SymbolIndex,
        file: FileId,
        path: &'a Path,
        queued: &'a mut Vec<FileChange>,
    ) -> Self {
        Self {
            index,
            file,
            path,
            queued,
        }
    }

    /// The project index, complete before any rule runs.
    pub fn index(&self) -> &'a SymbolIndex {
        self.index
    }

    /// Id of the file being rewritten.
    pub fn file(&self) -> FileId {
        self.file
    }

    /// Path of the file being rewritten.
    pub fn path(&self) -> &'a Path {
        self.path
    }

    /// Queue a new file.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<String>) {
        self.queued.push(FileChange::Add {
            path: path.into(),
            contents: contents.into(),
        });
    }

    /// Queue a move of the current file. It is still emitted at its
    /// original path first.
    pub fn move_file(&mut self, to: impl Into<PathBuf>) {
        self.queued.push(FileChange::Move {
            from: self.path.to_owned(),
            to: to.into(),
        });
    }

    /// Queue removal of the current file. Removed files are not emitted.
    pub fn remove_file(&mut self) {
        self.queued.push(FileChange::Remove {
            path: self.path.to_owned(),
        });
    }

    /// Queue removal of another file.
    pub fn remove_path(&mut self, path: impl Into<PathBuf>) {
        self.queued.push(FileChange::Remove { path: path.into() });
    }
}
