//! Error types of a pipeline run.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::phase::Phase;

/// A failure of one collaborator on one file.
///
/// Contained to the file it happened on: the run carries on without it.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The file needs code that cannot be loaded. Expected for partial
    /// projects; reporting it is optional.
    #[error("unresolved dependency: {0}")]
    DependencyResolution(String),

    /// Any other parser, rule or printer failure.
    #[error("{0}")]
    Failed(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl ProcessError {
    /// A missing-dependency failure.
    pub fn dependency(message: impl Into<String>) -> Self {
        ProcessError::DependencyResolution(message.into())
    }

    /// A generic failure.
    pub fn failed(message: impl Into<String>) -> Self {
        ProcessError::Failed(message.into())
    }

    /// Classification used in the run report.
    pub fn kind(&self) -> FileErrorKind {
        match self {
            ProcessError::DependencyResolution(_) => FileErrorKind::Dependency,
            ProcessError::Failed(_) => FileErrorKind::Failure,
            ProcessError::Io(_) => FileErrorKind::Io,
        }
    }

    pub fn is_dependency(&self) -> bool {
        matches!(self, ProcessError::DependencyResolution(_))
    }
}

/// Classification of a recorded file error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileErrorKind {
    Dependency,
    Failure,
    Io,
}

/// A failure that stops the whole run.
#[derive(Debug, Error)]
pub enum RunError {
    /// A file failed while the run was in debug mode.
    #[error("{phase} failed for {}: {source}", .path.display())]
    FileFailed {
        path: PathBuf,
        phase: Phase,
        #[source]
        source: ProcessError,
    },

    /// `only_rule` names no registered rule.
    #[error("unknown rule: {0}")]
    UnknownRule(String),
}
