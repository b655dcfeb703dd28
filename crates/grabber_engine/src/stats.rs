use std::sync::{Mutex, MutexGuard, PoisonError};

use engine_logging::engine_error;
use grabber_core::{JobLedger, JobStats, Outcome, RetrievalTask, TaskIndex};

/// Single synchronized owner of a job's task ledger and counters.
///
/// All updates go through [`StatsTracker::dispatch`] and
/// [`StatsTracker::settle`]; readers get copies.
#[derive(Debug)]
pub struct StatsTracker {
    ledger: Mutex<JobLedger>,
}

impl StatsTracker {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ledger: Mutex::new(JobLedger::new(urls)),
        }
    }

    /// Marks a task in flight and returns how many are in flight now.
    pub fn dispatch(&self, index: TaskIndex) -> usize {
        let mut ledger = self.lock();
        if let Err(err) = ledger.dispatch(index) {
            engine_error!("dispatch bookkeeping error: {}", err);
        }
        ledger.in_flight()
    }

    /// Records a settlement and returns the counters and in-flight count after it.
    pub fn settle(&self, index: TaskIndex, outcome: Outcome) -> (JobStats, usize) {
        let mut ledger = self.lock();
        if let Err(err) = ledger.settle(index, outcome) {
            engine_error!("settle bookkeeping error: {}", err);
        }
        (ledger.stats(), ledger.in_flight())
    }

    pub fn snapshot(&self) -> JobStats {
        self.lock().stats()
    }

    pub fn tasks(&self) -> Vec<RetrievalTask> {
        self.lock().tasks().to_vec()
    }

    pub fn in_flight(&self) -> usize {
        self.lock().in_flight()
    }

    pub fn peak_in_flight(&self) -> usize {
        self.lock().peak_in_flight()
    }

    // A panic while holding the lock cannot leave the ledger half-updated,
    // so a poisoned lock is still safe to read.
    fn lock(&self) -> MutexGuard<'_, JobLedger> {
        self.ledger.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
