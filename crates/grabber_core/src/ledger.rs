use thiserror::Error;

use crate::{JobStats, Outcome, RetrievalTask, TaskIndex, TaskStatus};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    #[error("no task with index {0}")]
    UnknownTask(TaskIndex),
    #[error("task {index} cannot move from {from} to {to}")]
    InvalidTransition {
        index: TaskIndex,
        from: TaskStatus,
        to: TaskStatus,
    },
}

/// Per-job record of every task and the counters derived from them.
///
/// Tasks are created once and never removed. A task moves
/// Pending -> InFlight -> Succeeded | Failed, and the counters are updated in
/// the same call that settles it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobLedger {
    tasks: Vec<RetrievalTask>,
    stats: JobStats,
    in_flight: usize,
    peak_in_flight: usize,
}

impl JobLedger {
    pub fn new<I, S>(urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tasks: Vec<RetrievalTask> = urls
            .into_iter()
            .enumerate()
            .map(|(index, url)| RetrievalTask::new(index, url))
            .collect();
        let stats = JobStats::new(tasks.len());
        Self {
            tasks,
            stats,
            in_flight: 0,
            peak_in_flight: 0,
        }
    }

    pub fn dispatch(&mut self, index: TaskIndex) -> Result<(), LedgerError> {
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(LedgerError::UnknownTask(index))?;
        if task.status != TaskStatus::Pending {
            return Err(LedgerError::InvalidTransition {
                index,
                from: task.status,
                to: TaskStatus::InFlight,
            });
        }
        task.status = TaskStatus::InFlight;
        self.in_flight += 1;
        self.peak_in_flight = self.peak_in_flight.max(self.in_flight);
        Ok(())
    }

    /// Settles an in-flight task and returns the counters after the update.
    pub fn settle(&mut self, index: TaskIndex, outcome: Outcome) -> Result<JobStats, LedgerError> {
        let task = self
            .tasks
            .get_mut(index)
            .ok_or(LedgerError::UnknownTask(index))?;
        let next = TaskStatus::from(outcome);
        if task.status != TaskStatus::InFlight {
            return Err(LedgerError::InvalidTransition {
                index,
                from: task.status,
                to: next,
            });
        }
        task.status = next;
        self.in_flight -= 1;
        self.stats.record(outcome);
        Ok(self.stats)
    }

    pub fn stats(&self) -> JobStats {
        self.stats
    }

    pub fn tasks(&self) -> &[RetrievalTask] {
        &self.tasks
    }

    pub fn task(&self, index: TaskIndex) -> Option<&RetrievalTask> {
        self.tasks.get(index)
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight
    }
}
