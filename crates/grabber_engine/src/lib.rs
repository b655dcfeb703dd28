//! Grabber engine: resilient image retrieval and archive packaging.
mod archive;
mod config;
mod engine;
mod fetch;
mod persist;
mod proxy;
pub mod relay;
mod render;
mod scheduler;
mod stats;
mod strategy;
mod types;

pub use archive::{
    suggested_archive_name, ArchiveBuilder, ArchiveEntry, ArchiveError, FinishedArchive,
};
pub use config::{ConfigError, EngineConfig, DEFAULT_USER_AGENT};
pub use engine::{run_job, run_job_with, EngineHandle};
pub use fetch::{
    is_image_content_type, ChannelProgressSink, FetchOutput, FetchRequest, FetchSettings,
    Fetcher, NullProgressSink, ProgressSink, ReqwestFetcher, IMAGE_ACCEPT,
};
pub use persist::{ArchiveWriter, PersistError};
pub use proxy::{race, ProxyEndpoint, ProxyList, RaceSettings, RaceWin, PUBLIC_RELAYS};
pub use render::{
    reencode_as_jpeg, DecodeRenderer, DisabledRenderer, RenderedImage, Renderer,
    RENDERED_CONTENT_TYPE,
};
pub use scheduler::{BatchScheduler, SchedulePolicy};
pub use stats::StatsTracker;
pub use strategy::{Attempt, Strategy, StrategyChain};
pub use types::{
    EngineEvent, FailureKind, FailureReason, FetchError, JobError, JobProgress, JobReport,
    RetrievalFailure, RetrievalResult, StageFailure, StrategyKind, TaskSettlement,
};
