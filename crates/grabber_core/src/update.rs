use crate::{AppState, Effect, JobStats, Msg, SessionState, StatusTone};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::UrlsLoaded(raw) => {
            if state.session() != SessionState::Idle {
                return (state, Vec::new());
            }
            let urls: Vec<String> = raw
                .into_iter()
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .collect();
            if urls.is_empty() {
                state.set_status("No image URLs found", StatusTone::Error);
                return (state, Vec::new());
            }
            state.set_session(SessionState::Running);
            state.set_stats(JobStats::new(urls.len()));
            state.set_status(
                format!("Downloading {} images...", urls.len()),
                StatusTone::Downloading,
            );
            vec![Effect::StartJob { urls }]
        }
        Msg::Progress(stats) => {
            if matches!(
                state.session(),
                SessionState::Running | SessionState::Cancelling
            ) {
                state.set_stats(stats);
                state.set_status(
                    format!(
                        "Processing: {}/{} ({} successful)",
                        stats.processed(),
                        stats.total(),
                        stats.succeeded()
                    ),
                    StatusTone::Downloading,
                );
            }
            Vec::new()
        }
        Msg::Packaging => {
            if matches!(
                state.session(),
                SessionState::Running | SessionState::Cancelling
            ) {
                state.set_session(SessionState::Packaging);
                state.set_status("Creating ZIP file...", StatusTone::Zipping);
            }
            Vec::new()
        }
        Msg::JobFinished {
            stats,
            archive_path,
        } => {
            state.set_stats(stats);
            state.set_archive_path(archive_path);
            if stats.succeeded() == 0 && stats.total() > 0 {
                state.set_session(SessionState::Failed);
                state.set_status(
                    format!("No images could be downloaded ({} failed)", stats.failed()),
                    StatusTone::Error,
                );
            } else {
                state.set_session(SessionState::Finished);
                let tone = if stats.failed() > 0 {
                    StatusTone::Warning
                } else {
                    StatusTone::Complete
                };
                state.set_status(
                    format!(
                        "Complete! {} downloaded, {} failed",
                        stats.succeeded(),
                        stats.failed()
                    ),
                    tone,
                );
            }
            Vec::new()
        }
        Msg::JobFailed { stats, message } => {
            state.set_stats(stats);
            state.set_session(SessionState::Failed);
            state.set_status(format!("Error creating ZIP: {message}"), StatusTone::Error);
            Vec::new()
        }
        Msg::EngineFailed { message } => {
            state.set_session(SessionState::Failed);
            state.set_status(format!("Engine error: {message}"), StatusTone::Error);
            Vec::new()
        }
        Msg::CancelRequested => {
            if state.session() == SessionState::Running {
                state.set_session(SessionState::Cancelling);
                vec![Effect::CancelJob]
            } else {
                Vec::new()
            }
        }
    };

    (state, effects)
}
