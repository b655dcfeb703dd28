use std::fmt;

/// Zero-based ordinal of a task within its job.
pub type TaskIndex = usize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    InFlight,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_settled(self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            TaskStatus::Pending => "pending",
            TaskStatus::InFlight => "in flight",
            TaskStatus::Succeeded => "succeeded",
            TaskStatus::Failed => "failed",
        };
        f.write_str(label)
    }
}

/// Terminal result of a task, as far as bookkeeping is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Succeeded,
    Failed,
}

impl From<Outcome> for TaskStatus {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Succeeded => TaskStatus::Succeeded,
            Outcome::Failed => TaskStatus::Failed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalTask {
    pub url: String,
    pub index: TaskIndex,
    pub status: TaskStatus,
}

impl RetrievalTask {
    pub fn new(index: TaskIndex, url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            index,
            status: TaskStatus::Pending,
        }
    }
}
