use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use grabber_core::{JobStats, RetrievalTask, TaskIndex, TaskStatus};
use thiserror::Error;

use crate::archive::{ArchiveError, FinishedArchive};
use crate::config::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StrategyKind {
    Direct,
    ProxyRace,
    Rendered,
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StrategyKind::Direct => write!(f, "direct"),
            StrategyKind::ProxyRace => write!(f, "proxy race"),
            StrategyKind::Rendered => write!(f, "rendered"),
        }
    }
}

/// A single failed network or decode attempt. Never fatal on its own.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    Network,
    Timeout,
    RedirectLimitExceeded,
    BadStatus(u16),
    WrongContentType { content_type: String },
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Relay,
    Decode,
    AllProxiesFailed { attempted: usize },
    Disabled,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::BadStatus(code) => write!(f, "http status {code}"),
            FailureKind::WrongContentType { content_type } => {
                write!(f, "not an image ({content_type})")
            }
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Relay => write!(f, "relay error"),
            FailureKind::Decode => write!(f, "decode error"),
            FailureKind::AllProxiesFailed { attempted } => {
                write!(f, "all {attempted} proxies failed")
            }
            FailureKind::Disabled => write!(f, "disabled"),
        }
    }
}

/// Bytes produced by the first strategy that succeeded for a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievalResult {
    pub task_index: TaskIndex,
    pub bytes: Bytes,
    pub content_type: Option<String>,
    pub strategy: StrategyKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageFailure {
    pub strategy: StrategyKind,
    pub error: FetchError,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureReason {
    #[error("all strategies exhausted")]
    AllStrategiesExhausted,
    #[error("timed out after {0:?}")]
    TimedOut(Duration),
    #[error("cancelled")]
    Cancelled,
}

/// Terminal per-task failure. Carries the attempt log, never partial bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("task {} ({url}) failed: {reason}", .task_index + 1)]
pub struct RetrievalFailure {
    pub task_index: TaskIndex,
    pub url: String,
    pub reason: FailureReason,
    pub attempts: Vec<StageFailure>,
}

impl RetrievalFailure {
    pub(crate) fn new(task_index: TaskIndex, url: &str, reason: FailureReason) -> Self {
        Self {
            task_index,
            url: url.to_string(),
            reason,
            attempts: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSettlement {
    pub index: TaskIndex,
    pub status: TaskStatus,
    pub strategy: Option<StrategyKind>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobProgress {
    pub stats: JobStats,
    pub in_flight: usize,
    pub settled: TaskSettlement,
}

#[derive(Debug, Clone)]
pub struct JobReport {
    pub archive: FinishedArchive,
    pub stats: JobStats,
    pub tasks: Vec<RetrievalTask>,
    pub failures: Vec<RetrievalFailure>,
    pub peak_in_flight: usize,
    pub cancelled: bool,
}

#[derive(Debug, Error)]
pub enum JobError {
    #[error("archive finalization failed with {stats}: {source}")]
    Archive {
        #[source]
        source: ArchiveError,
        stats: JobStats,
    },
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("http client setup failed: {0}")]
    Client(#[source] FetchError),
    #[error("engine runtime unavailable: {0}")]
    Runtime(String),
}

#[derive(Debug)]
pub enum EngineEvent {
    Started { total: usize },
    Progress(JobProgress),
    Packaging { entries: usize },
    Completed(Result<JobReport, JobError>),
}
