use crate::view_model::{AppViewModel, StatusTone};
use crate::JobStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Running,
    Cancelling,
    Packaging,
    Finished,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    stats: Option<JobStats>,
    status_text: String,
    tone: StatusTone,
    archive_path: Option<String>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn stats(&self) -> Option<JobStats> {
        self.stats
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            status_text: self.status_text.clone(),
            tone: self.tone,
            percent: self.stats.map(|s| s.percent()).unwrap_or(0),
            stats: self.stats,
            archive_path: self.archive_path.clone(),
        }
    }

    /// Returns whether anything changed since the last call and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn set_session(&mut self, session: SessionState) {
        self.session = session;
        self.dirty = true;
    }

    pub(crate) fn set_stats(&mut self, stats: JobStats) {
        self.stats = Some(stats);
        self.dirty = true;
    }

    pub(crate) fn set_status(&mut self, text: impl Into<String>, tone: StatusTone) {
        self.status_text = text.into();
        self.tone = tone;
        self.dirty = true;
    }

    pub(crate) fn set_archive_path(&mut self, path: String) {
        self.archive_path = Some(path);
        self.dirty = true;
    }
}
