use crate::JobStats;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// URLs extracted from the input table.
    UrlsLoaded(Vec<String>),
    /// Engine counters after a task settled.
    Progress(JobStats),
    /// All tasks settled; the archive is being compressed.
    Packaging,
    /// The archive was produced and saved.
    JobFinished { stats: JobStats, archive_path: String },
    /// The job could not produce an archive.
    JobFailed { stats: JobStats, message: String },
    /// The engine stopped before any archive work, e.g. it could not start.
    EngineFailed { message: String },
    /// User asked to abort the running job.
    CancelRequested,
}
