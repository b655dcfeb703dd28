use crate::{JobStats, SessionState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusTone {
    #[default]
    Idle,
    Downloading,
    Zipping,
    Complete,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub status_text: String,
    pub tone: StatusTone,
    pub percent: u8,
    pub stats: Option<JobStats>,
    pub archive_path: Option<String>,
}
