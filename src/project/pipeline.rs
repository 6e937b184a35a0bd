//! Pipeline orchestrator: parse, transform, emit, reconcile.
//!
//! A run moves through the phases of [`Phase`] once:
//!
//! 1. **Parsing** - read and parse every file, then collect each tree into
//!    the symbol index in input order. Parsing may run on the rayon pool;
//!    collection never does.
//! 2. **Transforming** - apply the active rules to every parsed file.
//! 3. **Emitting** - render changed files and record a [`FileDiff`] for
//!    every emitted file. Write mode writes changed files; diff-only mode
//!    renders unified diffs and leaves the file system alone.
//! 4. **Reconciling** - apply the file operations rules queued, after every
//!    diff exists. Diff-only mode reports them without applying them.
//!
//! A failure is contained to its file: the file drops out of later phases
//! and the rest of the batch carries on. Debug mode turns the first
//! non-dependency failure into a [`RunError`] instead.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use rayon::prelude::*;
use rustc_hash::FxHashSet;
use smol_str::SmolStr;

use super::collaborators::{NoProgress, Parser, Printer, ProgressObserver, Rule, RuleContext};
use super::errors::{ProcessError, RunError};
use super::file_set::FileSet;
use super::fs::FileSystem;
use super::options::{RunMode, RunOptions};
use super::phase::Phase;
use super::report::{FileChange, FileDiff, FileError, RunReport};
use crate::base::FileId;
use crate::hir::{Capabilities, SymbolIndex};
use crate::syntax::SourceTree;

/// A parsed file moving through the phases.
#[derive(Debug)]
struct WorkFile {
    id: FileId,
    path: PathBuf,
    /// `None` once the file has failed and left the run.
    tree: Option<SourceTree>,
    applied_rules: Vec<SmolStr>,
}

/// Drives a batch of files through the phases.
///
/// ```ignore
/// let mut pipeline = Pipeline::new(parser, printer, Arc::new(OsFileSystem))
///     .with_rule(RenameClass::new("Old", "New"))
///     .with_options(RunOptions::new().diff_only());
/// let report = pipeline.run(&paths)?;
/// ```
pub struct Pipeline {
    parser: Box<dyn Parser>,
    printer: Box<dyn Printer>,
    fs: Arc<dyn FileSystem>,
    rules: Vec<Box<dyn Rule>>,
    observer: Box<dyn ProgressObserver>,
    options: RunOptions,
    caps: Capabilities,
    /// Rebuilt at the start of every run.
    index: SymbolIndex,
    files: FileSet,
    phase: Phase,
}

impl Pipeline {
    /// A pipeline with no rules and default options.
    pub fn new(
        parser: impl Parser + 'static,
        printer: impl Printer + 'static,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            parser: Box::new(parser),
            printer: Box::new(printer),
            fs,
            rules: Vec::new(),
            observer: Box::new(NoProgress),
            options: RunOptions::default(),
            caps: Capabilities::default(),
            index: SymbolIndex::new(),
            files: FileSet::new(),
            phase: Phase::Idle,
        }
    }

    /// Append a rule. Rules run in the order they were added.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    /// Replace the run options.
    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    /// Bind type inference and introspection to the index of every run.
    pub fn with_capabilities(mut self, caps: Capabilities) -> Self {
        self.index.bind(caps.clone());
        self.caps = caps;
        self
    }

    /// Report per-file progress to `observer`.
    pub fn with_observer(mut self, observer: impl ProgressObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    /// The phase the last run reached.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The index built by the last run.
    pub fn index(&self) -> &SymbolIndex {
        &self.index
    }

    /// The files of the last run.
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Run the batch.
    ///
    /// Each run starts from an empty index and file set; the index stays
    /// readable through [`Pipeline::index`] until the next run.
    ///
    /// Per-file failures end up in the report. An `Err` means the run was
    /// aborted: an unknown `only_rule`, or a file failure in debug mode.
    pub fn run(&mut self, paths: &[PathBuf]) -> Result<RunReport, RunError> {
        if let Some(only) = &self.options.only_rule {
            if !self.rules.iter().any(|rule| rule.id() == only) {
                return Err(RunError::UnknownRule(only.clone()));
            }
        }

        let _span = tracing::info_span!("run", files = paths.len(), mode = ?self.options.mode)
            .entered();
        let mut report = RunReport::new();
        let mut queued = Vec::new();
        self.phase = Phase::Idle;
        // Nothing carries over from an earlier run.
        self.index = SymbolIndex::new().with_capabilities(self.caps.clone());
        self.files = FileSet::new();

        self.advance(Phase::Parsing);
        let mut files = self.parse_files(paths, &mut report)?;

        self.advance(Phase::Transforming);
        self.transform_files(&mut files, &mut queued, &mut report)?;

        self.advance(Phase::Emitting);
        self.emit_files(&files, &queued, &mut report)?;

        self.advance(Phase::Reconciling);
        self.reconcile_files(queued, &mut report)?;

        self.advance(Phase::Done);
        tracing::info!(
            "run finished: {} emitted, {} changed, {} errors",
            report.diffs().len(),
            report.changed_diffs().count(),
            report.error_count()
        );
        Ok(report)
    }

    fn advance(&mut self, to: Phase) {
        debug_assert_eq!(self.phase.next(), to, "phases only move forward");
        self.phase = to;
    }

    // ========================================================================
    // PARSING
    // ========================================================================

    fn parse_files(
        &mut self,
        paths: &[PathBuf],
        report: &mut RunReport,
    ) -> Result<Vec<WorkFile>, RunError> {
        let _span = tracing::info_span!("parse_files", files = paths.len()).entered();

        let mut seen = FxHashSet::default();
        let batch: Vec<(FileId, &PathBuf)> = paths
            .iter()
            .map(|path| (self.files.file_id(path), path))
            .filter(|(id, _)| seen.insert(*id))
            .collect();

        let parser = self.parser.as_ref();
        let fs = self.fs.as_ref();
        let results: Vec<_> = if self.options.parallel_parse {
            batch
                .par_iter()
                .map(|(_, path)| read_and_parse(fs, parser, path))
                .collect()
        } else {
            batch
                .iter()
                .map(|(_, path)| read_and_parse(fs, parser, path))
                .collect()
        };

        let mut files = Vec::with_capacity(batch.len());
        for ((id, path), result) in batch.into_iter().zip(results) {
            self.observer.on_file(Phase::Parsing, path);
            match result {
                Ok((content, mut tree)) => {
                    tree.file = id;
                    self.index.collect_tree(&tree);
                    self.files.set_contents(id, content);
                    tracing::debug!("parsed {} as {}", path.display(), id);
                    files.push(WorkFile {
                        id,
                        path: path.clone(),
                        tree: Some(tree),
                        applied_rules: Vec::new(),
                    });
                }
                Err(error) => {
                    self.record_failure(report, path, Phase::Parsing, error)?;
                }
            }
        }

        tracing::debug!("index after collection: {:?}", self.index.stats());
        Ok(files)
    }

    // ========================================================================
    // TRANSFORMING
    // ========================================================================

    fn transform_files(
        &self,
        files: &mut [WorkFile],
        queued: &mut Vec<FileChange>,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        let _span = tracing::info_span!("transform_files", files = files.len()).entered();

        for file in files.iter_mut() {
            let Some(tree) = file.tree.as_mut() else {
                continue;
            };
            self.observer.on_file(Phase::Transforming, &file.path);

            let queued_before = queued.len();
            let mut failure = None;
            for rule in self.active_rules() {
                let mut ctx = RuleContext::new(&self.index, file.id, &file.path, queued);
                match rule.refactor(tree, &mut ctx) {
                    Ok(true) => {
                        tracing::debug!("{} changed {}", rule.id(), file.path.display());
                        file.applied_rules.push(SmolStr::new(rule.id()));
                    }
                    Ok(false) => {}
                    Err(error) => {
                        failure = Some(error);
                        break;
                    }
                }
            }

            if let Some(error) = failure {
                // A failed file leaves no trace in later phases.
                queued.truncate(queued_before);
                file.tree = None;
                self.record_failure(report, &file.path, Phase::Transforming, error)?;
            }
        }
        Ok(())
    }

    fn active_rules(&self) -> impl Iterator<Item = &dyn Rule> {
        self.rules
            .iter()
            .map(|rule| rule.as_ref())
            .filter(|rule| self.options.rule_enabled(rule.id()))
    }

    // ========================================================================
    // EMITTING
    // ========================================================================

    fn emit_files(
        &self,
        files: &[WorkFile],
        queued: &[FileChange],
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        let _span = tracing::info_span!("emit_files", files = files.len()).entered();

        for file in files {
            let Some(tree) = &file.tree else {
                continue;
            };
            if is_queued_for_removal(queued, &file.path) {
                tracing::debug!("not emitting removed file {}", file.path.display());
                continue;
            }
            self.observer.on_file(Phase::Emitting, &file.path);

            let old = self.files.contents(file.id).unwrap_or_default().to_string();
            // Files no rule changed are not re-rendered.
            let new = if file.applied_rules.is_empty() {
                old.clone()
            } else {
                match self.printer.render(tree) {
                    Ok(rendered) => rendered,
                    Err(error) => {
                        self.record_failure(report, &file.path, Phase::Emitting, error)?;
                        continue;
                    }
                }
            };

            let diff = FileDiff {
                file: file.id,
                path: file.path.clone(),
                old,
                new,
                applied_rules: file.applied_rules.clone(),
            };

            if diff.is_changed() {
                match self.options.mode {
                    RunMode::Write => {
                        if let Err(error) = self.fs.write(&diff.path, &diff.new) {
                            self.record_failure(report, &file.path, Phase::Emitting, error.into())?;
                        }
                    }
                    RunMode::DiffOnly => {
                        let rendered = diff.unified_diff(self.options.diff_context);
                        report.add_rendered_diff(file.id, rendered);
                    }
                }
            }
            report.add_diff(diff);
        }
        Ok(())
    }

    // ========================================================================
    // RECONCILING
    // ========================================================================

    fn reconcile_files(
        &self,
        mut queued: Vec<FileChange>,
        report: &mut RunReport,
    ) -> Result<(), RunError> {
        let _span = tracing::info_span!("reconcile_files", changes = queued.len()).entered();

        queued.sort_by_key(FileChange::apply_order);
        for change in queued {
            if self.options.is_dry_run() {
                report.add_change(change, false);
                continue;
            }

            self.observer.on_file(Phase::Reconciling, change.path());
            match self.apply_change(&change) {
                Ok(()) => {
                    tracing::debug!("applied {:?}", change);
                    report.add_change(change, true);
                }
                Err(error) => {
                    let path = change.path().to_owned();
                    report.add_change(change, false);
                    self.record_failure(report, &path, Phase::Reconciling, error.into())?;
                }
            }
        }
        Ok(())
    }

    fn apply_change(&self, change: &FileChange) -> std::io::Result<()> {
        match change {
            FileChange::Add { path, contents } => self.fs.write(path, contents),
            FileChange::Move { from, to } => self.fs.rename(from, to),
            FileChange::Remove { path } => self.fs.remove(path),
        }
    }

    // ========================================================================
    // FAILURES
    // ========================================================================

    /// Record a file failure, or abort the run in debug mode.
    fn record_failure(
        &self,
        report: &mut RunReport,
        path: &Path,
        phase: Phase,
        error: ProcessError,
    ) -> Result<(), RunError> {
        if error.is_dependency() {
            tracing::warn!("excluding {}: {}", path.display(), error);
            if self.options.report_dependency_errors {
                report.add_error(FileError::new(path, phase, &error));
            }
            return Ok(());
        }

        if self.options.debug {
            return Err(RunError::FileFailed {
                path: path.to_owned(),
                phase,
                source: error,
            });
        }

        tracing::warn!("{} failed for {}: {}", phase, path.display(), error);
        report.add_error(FileError::new(path, phase, &error));
        Ok(())
    }
}

fn read_and_parse(
    fs: &dyn FileSystem,
    parser: &dyn Parser,
    path: &Path,
) -> Result<(String, SourceTree), ProcessError> {
    let content = fs.read(path)?;
    let tree = parser.parse(path, &content)?;
    Ok((content, tree))
}

fn is_queued_for_removal(queued: &[FileChange], path: &Path) -> bool {
    queued
        .iter()
        .any(|change| matches!(change, FileChange::Remove { path: removed } if removed == path))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::project::fs::MemoryFileSystem;
    use crate::syntax::{Expr, Stmt};

    /// One statement per line: `new X` or a bare name.
    struct LineParser;

    impl Parser for LineParser {
        fn parse(&self, _: &Path, content: &str) -> Result<SourceTree, ProcessError> {
            let stmts = content
                .lines()
                .map(|line| match line.strip_prefix("new ") {
                    Some(class) => Expr::new_instance(class).into_stmt(),
                    None => Expr::name(line).into_stmt(),
                })
                .collect();
            Ok(SourceTree::new(FileId::new(0), stmts))
        }
    }

    struct LinePrinter;

    impl Printer for LinePrinter {
        fn render(&self, tree: &SourceTree) -> Result<String, ProcessError> {
            let mut out = String::new();
            for stmt in &tree.stmts {
                match stmt {
                    Stmt::Expr(Expr::New { class, .. }) => match &**class {
                        Expr::Name(name) => out.push_str(&format!("new {name}\n")),
                        _ => return Err(ProcessError::failed("dynamic class")),
                    },
                    Stmt::Expr(Expr::Name(name)) => out.push_str(&format!("{name}\n")),
                    _ => return Err(ProcessError::failed("unsupported statement")),
                }
            }
            Ok(out)
        }
    }

    /// Renames every bare name `from` to `to`.
    struct Rename(&'static str, &'static str);

    impl Rule for Rename {
        fn id(&self) -> &str {
            "rename"
        }

        fn refactor(
            &self,
            tree: &mut SourceTree,
            _: &mut RuleContext<'_>,
        ) -> Result<bool, ProcessError> {
            let mut changed = false;
            tree.for_each_expr_mut(&mut |expr| {
                if let Expr::Name(name) = expr {
                    if name == self.0 {
                        *name = SmolStr::new(self.1);
                        changed = true;
                    }
                }
            });
            Ok(changed)
        }
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<(Phase, PathBuf)>>>);

    impl ProgressObserver for Recorder {
        fn on_file(&self, phase: Phase, path: &Path) {
            self.0.borrow_mut().push((phase, path.to_owned()));
        }
    }

    fn pipeline(fs: Arc<MemoryFileSystem>) -> Pipeline {
        Pipeline::new(LineParser, LinePrinter, fs).with_rule(Rename("Old", "New"))
    }

    #[test]
    fn test_run_ends_done_and_indexes_files() {
        let fs = Arc::new(MemoryFileSystem::new().with_file("a.txt", "new Old\n"));
        let mut pipeline = pipeline(fs.clone());

        let report = pipeline.run(&[PathBuf::from("a.txt")]).unwrap();

        assert_eq!(pipeline.phase(), Phase::Done);
        assert!(report.is_success());
        assert_eq!(pipeline.index().find_new_nodes_by_class("Old").len(), 1);
        assert_eq!(fs.contents(Path::new("a.txt")).as_deref(), Some("new New\n"));
        assert_eq!(report.diffs()[0].applied_rules, vec![SmolStr::new("rename")]);
    }

    #[test]
    fn test_each_run_starts_from_an_empty_index() {
        let fs = Arc::new(
            MemoryFileSystem::new()
                .with_file("a.txt", "new Old\n")
                .with_file("b.txt", "new Other\n"),
        );
        let mut pipeline = pipeline(fs);

        pipeline.run(&[PathBuf::from("a.txt")]).unwrap();
        pipeline.run(&[PathBuf::from("b.txt")]).unwrap();

        assert!(pipeline.index().find_new_nodes_by_class("Old").is_empty());
        assert_eq!(pipeline.index().find_new_nodes_by_class("Other").len(), 1);
        assert_eq!(pipeline.files().len(), 1);
        assert_eq!(pipeline.files().lookup(Path::new("b.txt")), Some(FileId::new(0)));
        assert!(pipeline.files().lookup(Path::new("a.txt")).is_none());
    }

    #[test]
    fn test_unknown_only_rule_aborts_before_parsing() {
        let fs = Arc::new(MemoryFileSystem::new());
        let mut pipeline =
            pipeline(fs).with_options(RunOptions::new().with_only_rule("does-not-exist"));

        let err = pipeline.run(&[]).unwrap_err();

        assert!(matches!(err, RunError::UnknownRule(_)));
        assert_eq!(pipeline.phase(), Phase::Idle);
    }

    #[test]
    fn test_progress_is_reported_per_file_per_phase() {
        let fs = Arc::new(
            MemoryFileSystem::new()
                .with_file("a.txt", "Old\n")
                .with_file("b.txt", "Other\n"),
        );
        let recorder = Recorder::default();
        let mut pipeline = pipeline(fs).with_observer(recorder.clone());

        pipeline
            .run(&[PathBuf::from("a.txt"), PathBuf::from("b.txt")])
            .unwrap();

        let events = recorder.0.borrow();
        let phases: Vec<Phase> = events.iter().map(|(phase, _)| *phase).collect();
        assert_eq!(
            phases,
            vec![
                Phase::Parsing,
                Phase::Parsing,
                Phase::Transforming,
                Phase::Transforming,
                Phase::Emitting,
                Phase::Emitting,
            ]
        );
    }

    #[test]
    fn test_duplicate_paths_are_processed_once() {
        let fs = Arc::new(MemoryFileSystem::new().with_file("a.txt", "Old\n"));
        let mut pipeline = pipeline(fs);

        let report = pipeline
            .run(&[PathBuf::from("a.txt"), PathBuf::from("a.txt")])
            .unwrap();

        assert_eq!(report.diffs().len(), 1);
    }

    #[test]
    fn test_printer_failure_is_contained() {
        struct Dynamic;

        impl Rule for Dynamic {
            fn id(&self) -> &str {
                "dynamic"
            }

            fn refactor(
                &self,
                tree: &mut SourceTree,
                _: &mut RuleContext<'_>,
            ) -> Result<bool, ProcessError> {
                tree.stmts.push(Expr::new_instance("X").into_stmt());
                if let Some(Stmt::Expr(Expr::New { class, .. })) = tree.stmts.last_mut() {
                    **class = Expr::var("cls");
                }
                Ok(true)
            }
        }

        let fs = Arc::new(MemoryFileSystem::new().with_file("a.txt", "A\n"));
        let mut pipeline = Pipeline::new(LineParser, LinePrinter, fs.clone()).with_rule(Dynamic);

        let report = pipeline.run(&[PathBuf::from("a.txt")]).unwrap();

        assert_eq!(report.error_count(), 1);
        assert_eq!(report.errors()[0].phase, Phase::Emitting);
        assert!(report.diffs().is_empty());
        assert_eq!(fs.contents(Path::new("a.txt")).as_deref(), Some("A\n"));
    }
}
