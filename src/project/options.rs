//! Run configuration.

/// What the emit phase does with rendered files.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Write changed files and apply queued file operations.
    #[default]
    Write,
    /// Report unified diffs only. The file system is never modified.
    DiffOnly,
}

/// Options of one pipeline run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub mode: RunMode,
    /// Run only the rule with this id.
    pub only_rule: Option<String>,
    /// Abort the run on the first non-dependency file failure.
    pub debug: bool,
    /// Record dependency failures as file errors. When off they are
    /// skipped silently.
    pub report_dependency_errors: bool,
    /// Parse files on the rayon pool. Collection stays sequential.
    pub parallel_parse: bool,
    /// Context lines around each hunk of a rendered diff.
    pub diff_context: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            mode: RunMode::Write,
            only_rule: None,
            debug: false,
            report_dependency_errors: true,
            parallel_parse: false,
            diff_context: 3,
        }
    }
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mut self, mode: RunMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn diff_only(self) -> Self {
        self.with_mode(RunMode::DiffOnly)
    }

    pub fn with_only_rule(mut self, rule: impl Into<String>) -> Self {
        self.only_rule = Some(rule.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn with_dependency_errors(mut self, report: bool) -> Self {
        self.report_dependency_errors = report;
        self
    }

    pub fn with_parallel_parse(mut self, parallel: bool) -> Self {
        self.parallel_parse = parallel;
        self
    }

    pub fn with_diff_context(mut self, lines: usize) -> Self {
        self.diff_context = lines;
        self
    }

    pub fn is_dry_run(&self) -> bool {
        self.mode == RunMode::DiffOnly
    }

    /// Is the rule with this id active for the run?
    pub fn rule_enabled(&self, id: &str) -> bool {
        self.only_rule.as_deref().is_none_or(|only| only == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RunOptions::default();
        assert_eq!(options.mode, RunMode::Write);
        assert_eq!(options.diff_context, 3);
        assert!(!options.debug);
        assert!(options.report_dependency_errors);
        assert!(options.rule_enabled("anything"));
    }

    #[test]
    fn test_only_rule_filters() {
        let options = RunOptions::new().diff_only().with_only_rule("rename-class");
        assert!(options.is_dry_run());
        assert!(options.rule_enabled("rename-class"));
        assert!(!options.rule_enabled("inline-constant"));
    }
}
