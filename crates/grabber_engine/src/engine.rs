use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::engine_error;
use tokio_util::sync::CancellationToken;

use crate::config::EngineConfig;
use crate::fetch::{ChannelProgressSink, Fetcher, ProgressSink, ReqwestFetcher};
use crate::scheduler::BatchScheduler;
use crate::strategy::StrategyChain;
use crate::{EngineEvent, JobError, JobReport};

/// Runs one job with the reqwest fetcher built from `config`.
pub async fn run_job(
    config: &EngineConfig,
    urls: &[String],
    sink: &dyn ProgressSink,
    cancel: CancellationToken,
) -> Result<JobReport, JobError> {
    let fetcher = ReqwestFetcher::new(config.fetch_settings()).map_err(JobError::Client)?;
    run_job_with(config, Arc::new(fetcher), urls, sink, cancel).await
}

/// Same as [`run_job`] with a caller-supplied fetcher.
pub async fn run_job_with(
    config: &EngineConfig,
    fetcher: Arc<dyn Fetcher>,
    urls: &[String],
    sink: &dyn ProgressSink,
    cancel: CancellationToken,
) -> Result<JobReport, JobError> {
    config.validate()?;
    let chain = StrategyChain::from_config(config, fetcher);
    BatchScheduler::new(chain, config.schedule, config.task_timeout())
        .with_compression_level(config.compression_level)
        .with_cancellation(cancel)
        .run(urls, sink)
        .await
}

/// A job running on its own thread and runtime, reporting through a channel.
pub struct EngineHandle {
    event_rx: mpsc::Receiver<EngineEvent>,
    cancel: CancellationToken,
}

impl EngineHandle {
    pub fn start(config: EngineConfig, urls: Vec<String>) -> Self {
        let (event_tx, event_rx) = mpsc::channel();
        let cancel = CancellationToken::new();
        let job_cancel = cancel.clone();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("failed to start tokio runtime: {}", err);
                    let _ = event_tx.send(EngineEvent::Completed(Err(JobError::Runtime(
                        err.to_string(),
                    ))));
                    return;
                }
            };
            let sink = ChannelProgressSink::new(event_tx.clone());
            let result = runtime.block_on(run_job(&config, &urls, &sink, job_cancel));
            if let Err(err) = &result {
                engine_error!("job failed: {}", err);
            }
            let _ = event_tx.send(EngineEvent::Completed(result));
        });

        Self { event_rx, cancel }
    }

    /// Requests an abort. Unfinished tasks settle as failed and the
    /// successes collected so far are still packaged.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    /// Blocks for the next event; `None` once the job thread is gone.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}
