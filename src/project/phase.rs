//! Pipeline phases.

use std::fmt;

/// Where a run stands. Phases only move forward.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Phase {
    #[default]
    Idle,
    Parsing,
    Transforming,
    Emitting,
    Reconciling,
    Done,
}

impl Phase {
    pub fn display(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Parsing => "parse",
            Phase::Transforming => "transform",
            Phase::Emitting => "emit",
            Phase::Reconciling => "reconcile",
            Phase::Done => "done",
        }
    }

    /// The phase that follows this one; `Done` is terminal.
    pub fn next(self) -> Self {
        match self {
            Phase::Idle => Phase::Parsing,
            Phase::Parsing => Phase::Transforming,
            Phase::Transforming => Phase::Emitting,
            Phase::Emitting => Phase::Reconciling,
            Phase::Reconciling | Phase::Done => Phase::Done,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phases_advance_in_order() {
        let mut phase = Phase::default();
        let mut seen = vec![phase];
        while phase != Phase::Done {
            phase = phase.next();
            seen.push(phase);
        }
        assert!(seen.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(seen.len(), 6);
        assert_eq!(Phase::Done.next(), Phase::Done);
    }
}
