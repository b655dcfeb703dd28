use std::sync::mpsc;
use std::thread;

use engine_logging::{engine_debug, engine_error, engine_info, engine_warn};
use grabber_core::{Effect, Msg};
use grabber_engine::{ArchiveWriter, EngineConfig, EngineEvent, EngineHandle, JobError, JobReport};
use tokio_util::sync::CancellationToken;

/// Carries out core effects against the engine and feeds results back as messages.
pub struct EffectRunner {
    config: EngineConfig,
    writer: ArchiveWriter,
    msg_tx: mpsc::Sender<Msg>,
    cancel: Option<CancellationToken>,
}

impl EffectRunner {
    pub fn new(config: EngineConfig, writer: ArchiveWriter, msg_tx: mpsc::Sender<Msg>) -> Self {
        Self {
            config,
            writer,
            msg_tx,
            cancel: None,
        }
    }

    pub fn enqueue(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartJob { urls } => {
                    engine_info!("starting engine for {} urls", urls.len());
                    let handle = EngineHandle::start(self.config.clone(), urls);
                    self.cancel = Some(handle.cancellation_token());
                    spawn_event_pump(handle, self.writer.clone(), self.msg_tx.clone());
                }
                Effect::CancelJob => match &self.cancel {
                    Some(cancel) => {
                        engine_warn!("cancellation requested; packaging what finished so far");
                        cancel.cancel();
                    }
                    None => engine_warn!("cancel requested with no running job"),
                },
            }
        }
    }
}

fn spawn_event_pump(handle: EngineHandle, writer: ArchiveWriter, msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        while let Some(event) = handle.recv() {
            let done = matches!(event, EngineEvent::Completed(_));
            if let Some(msg) = map_event(event, &writer) {
                if msg_tx.send(msg).is_err() {
                    return;
                }
            }
            if done {
                return;
            }
        }
    });
}

pub(crate) fn map_event(event: EngineEvent, writer: &ArchiveWriter) -> Option<Msg> {
    match event {
        EngineEvent::Started { .. } => None,
        EngineEvent::Progress(progress) => Some(Msg::Progress(progress.stats)),
        EngineEvent::Packaging { .. } => Some(Msg::Packaging),
        EngineEvent::Completed(result) => Some(completion_msg(result, writer)),
    }
}

/// Saves the archive of a finished job; a save failure is reported like a
/// packaging failure, with the counters intact.
pub(crate) fn completion_msg(result: Result<JobReport, JobError>, writer: &ArchiveWriter) -> Msg {
    let report = match result {
        Ok(report) => report,
        Err(JobError::Archive { source, stats }) => {
            return Msg::JobFailed {
                stats,
                message: source.to_string(),
            };
        }
        Err(err) => {
            return Msg::EngineFailed {
                message: err.to_string(),
            };
        }
    };

    for failure in &report.failures {
        engine_debug!("{} after {} attempts", failure, failure.attempts.len());
    }
    if report.cancelled {
        engine_warn!("job was cancelled: {}", report.stats);
    }

    match writer.save(&report.archive) {
        Ok(path) => {
            engine_info!(
                "saved {} entries to {}",
                report.archive.entry_count,
                path.display()
            );
            Msg::JobFinished {
                stats: report.stats,
                archive_path: path.display().to_string(),
            }
        }
        Err(err) => {
            engine_error!("failed to save archive: {}", err);
            Msg::JobFailed {
                stats: report.stats,
                message: err.to_string(),
            }
        }
    }
}
