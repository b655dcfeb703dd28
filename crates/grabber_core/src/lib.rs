//! Grabber core: pure job bookkeeping, archive naming and the session state machine.
mod effect;
mod ledger;
mod msg;
mod naming;
mod state;
mod stats;
mod task;
mod update;
mod view_model;

pub use effect::Effect;
pub use ledger::{JobLedger, LedgerError};
pub use msg::Msg;
pub use naming::{archive_entry_name, infer_extension, DEFAULT_EXTENSION};
pub use state::{AppState, SessionState};
pub use stats::JobStats;
pub use task::{Outcome, RetrievalTask, TaskIndex, TaskStatus};
pub use update::update;
pub use view_model::{AppViewModel, StatusTone};
