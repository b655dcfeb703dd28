use std::time::Duration;

use engine_logging::{engine_info, engine_warn};
use futures_util::future::join_all;
use futures_util::stream::{self, StreamExt};
use grabber_core::{Outcome, TaskIndex, TaskStatus};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::archive::{suggested_archive_name, ArchiveBuilder, ArchiveEntry};
use crate::fetch::ProgressSink;
use crate::stats::StatsTracker;
use crate::strategy::StrategyChain;
use crate::{
    EngineEvent, FailureReason, JobError, JobProgress, JobReport, RetrievalFailure,
    TaskSettlement,
};

/// How tasks are released to the strategy chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SchedulePolicy {
    /// Fixed windows; the next window starts once every task in the current one settled.
    Windowed { size: usize },
    /// Sliding ceiling; a new task starts as soon as any running one settles.
    Ceiling { limit: usize },
}

impl SchedulePolicy {
    /// Upper bound on simultaneously in-flight tasks.
    pub fn concurrency(&self) -> usize {
        match self {
            SchedulePolicy::Windowed { size } => *size,
            SchedulePolicy::Ceiling { limit } => *limit,
        }
    }
}

impl Default for SchedulePolicy {
    fn default() -> Self {
        SchedulePolicy::Ceiling { limit: 5 }
    }
}

pub struct BatchScheduler {
    chain: StrategyChain,
    policy: SchedulePolicy,
    task_timeout: Duration,
    compression_level: i64,
    cancel: CancellationToken,
}

impl BatchScheduler {
    pub fn new(chain: StrategyChain, policy: SchedulePolicy, task_timeout: Duration) -> Self {
        Self {
            chain,
            policy,
            task_timeout,
            compression_level: 6,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = level;
        self
    }

    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Retrieves every URL, then packages the successes.
    ///
    /// Every task settles exactly once, whatever the completion order; a
    /// failing task never stops its siblings. Only archive finalization can
    /// fail the job, and that error still carries the final counters.
    pub async fn run(&self, urls: &[String], sink: &dyn ProgressSink) -> Result<JobReport, JobError> {
        let tracker = StatsTracker::new(urls.iter().cloned());
        let archive = ArchiveBuilder::new(self.compression_level);
        let concurrency = self.policy.concurrency().max(1);

        engine_info!(
            "starting job: {} urls, {:?}",
            urls.len(),
            self.policy
        );
        sink.emit(EngineEvent::Started { total: urls.len() });

        let jobs = urls
            .iter()
            .enumerate()
            .map(|(index, url)| self.settle_one(index, url, &tracker, &archive, sink));

        let failures: Vec<RetrievalFailure> = match self.policy {
            SchedulePolicy::Windowed { .. } => {
                let mut failures = Vec::new();
                let mut jobs = jobs.peekable();
                while jobs.peek().is_some() {
                    let window: Vec<_> = jobs.by_ref().take(concurrency).collect();
                    failures.extend(join_all(window).await.into_iter().flatten());
                }
                failures
            }
            SchedulePolicy::Ceiling { .. } => {
                stream::iter(jobs)
                    .buffer_unordered(concurrency)
                    .filter_map(|failure| async move { failure })
                    .collect()
                    .await
            }
        };

        let stats = tracker.snapshot();
        let cancelled = failures
            .iter()
            .any(|failure| failure.reason == FailureReason::Cancelled);
        engine_info!("all tasks settled: {}", stats);
        sink.emit(EngineEvent::Packaging {
            entries: archive.len(),
        });

        let name = suggested_archive_name(chrono::Utc::now().timestamp_millis());
        let finished = tokio::task::spawn_blocking(move || archive.finalize(name))
            .await
            .map_err(|err| crate::ArchiveError::Task(err.to_string()))
            .and_then(|result| result)
            .map_err(|source| JobError::Archive { source, stats })?;

        Ok(JobReport {
            archive: finished,
            stats,
            tasks: tracker.tasks(),
            failures,
            peak_in_flight: tracker.peak_in_flight(),
            cancelled,
        })
    }

    async fn settle_one(
        &self,
        index: TaskIndex,
        url: &str,
        tracker: &StatsTracker,
        archive: &ArchiveBuilder,
        sink: &dyn ProgressSink,
    ) -> Option<RetrievalFailure> {
        tracker.dispatch(index);

        let outcome = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                Err(RetrievalFailure::new(index, url, FailureReason::Cancelled))
            }
            result = tokio::time::timeout(self.task_timeout, self.chain.retrieve(index, url)) => {
                match result {
                    Ok(result) => result,
                    Err(_) => Err(RetrievalFailure::new(
                        index,
                        url,
                        FailureReason::TimedOut(self.task_timeout),
                    )),
                }
            }
        };

        let (strategy, failure) = match outcome {
            Ok(result) => {
                archive.add(ArchiveEntry::for_task(index, url, result.bytes));
                (Some(result.strategy), None)
            }
            Err(failure) => {
                engine_warn!("{}", failure);
                (None, Some(failure))
            }
        };

        let (status, settlement) = if failure.is_none() {
            (TaskStatus::Succeeded, Outcome::Succeeded)
        } else {
            (TaskStatus::Failed, Outcome::Failed)
        };
        let (stats, in_flight) = tracker.settle(index, settlement);
        sink.emit(EngineEvent::Progress(JobProgress {
            stats,
            in_flight,
            settled: TaskSettlement {
                index,
                status,
                strategy,
            },
        }));
        failure
    }
}
