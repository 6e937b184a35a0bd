//! Project layer: running batches of files through the rewrite pipeline.
//!
//! ## Usage
//!
//! ```ignore
//! use rewrite::project::{collect_source_paths, OsFileSystem, Pipeline, RunOptions};
//!
//! let paths = collect_source_paths(Path::new("src"), &["php"]);
//! let mut pipeline = Pipeline::new(parser, printer, Arc::new(OsFileSystem))
//!     .with_rule(my_rule)
//!     .with_options(RunOptions::new().diff_only());
//!
//! let report = pipeline.run(&paths)?;
//! for diff in report.rendered_diffs() {
//!     print!("{diff}");
//! }
//! ```

mod collaborators;
mod errors;
mod file_set;
mod fs;
mod options;
mod phase;
mod pipeline;
mod report;

pub use collaborators::{NoProgress, Parser, Printer, ProgressObserver, Rule, RuleContext};
pub use errors::{FileErrorKind, ProcessError, RunError};
pub use file_set::{FileSet, collect_source_paths};
pub use fs::{FileSystem, MemoryFileSystem, OsFileSystem};
pub use options::{RunMode, RunOptions};
pub use phase::Phase;
pub use pipeline::Pipeline;
pub use report::{FileChange, FileDiff, FileError, ReconciledChange, RunReport};
