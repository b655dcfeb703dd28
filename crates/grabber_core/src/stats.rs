use std::fmt;

use crate::Outcome;

/// Job-wide counters.
///
/// Counters only move forward and only through [`JobStats::record`], which
/// keeps `processed == succeeded + failed` after every update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct JobStats {
    total: usize,
    processed: usize,
    succeeded: usize,
    failed: usize,
}

impl JobStats {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            ..Self::default()
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn processed(&self) -> usize {
        self.processed
    }

    pub fn succeeded(&self) -> usize {
        self.succeeded
    }

    pub fn failed(&self) -> usize {
        self.failed
    }

    pub fn is_complete(&self) -> bool {
        self.processed == self.total
    }

    pub fn is_consistent(&self) -> bool {
        self.processed == self.succeeded + self.failed && self.processed <= self.total
    }

    /// Whole-number completion percentage; an empty job counts as done.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 100;
        }
        ((self.processed * 100) / self.total).min(100) as u8
    }

    pub(crate) fn record(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Succeeded => self.succeeded += 1,
            Outcome::Failed => self.failed += 1,
        }
        self.processed += 1;
    }
}

impl fmt::Display for JobStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} processed ({} succeeded, {} failed)",
            self.processed, self.total, self.succeeded, self.failed
        )
    }
}
