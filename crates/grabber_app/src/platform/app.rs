use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use engine_logging::{engine_info, engine_warn};
use grabber_core::{update, AppState, AppViewModel, Msg, SessionState, StatusTone};
use grabber_engine::ArchiveWriter;

use super::effects::EffectRunner;
use super::{config_file, input, ui};
use crate::FetchArgs;

/// Runs one fetch job to completion. `Ok(false)` means the job ran but
/// produced nothing usable.
pub fn run_fetch(args: &FetchArgs) -> anyhow::Result<bool> {
    let urls = input::load_urls(&args.input, args.column.as_deref())?;
    let config = config_file::apply_overrides(config_file::load(args.config.as_deref())?, args);
    config.validate().context("invalid engine configuration")?;
    engine_info!(
        "{} proxies configured, schedule {:?}",
        config.proxies.len(),
        config.schedule
    );

    let (msg_tx, msg_rx) = mpsc::channel::<Msg>();
    let mut runner = EffectRunner::new(config, ArchiveWriter::new(&args.out_dir), msg_tx.clone());
    spawn_interrupt_listener(msg_tx.clone());

    let mut state = AppState::new();
    msg_tx
        .send(Msg::UrlsLoaded(urls))
        .context("message channel closed")?;

    for msg in msg_rx.iter() {
        let (next, effects) = update(std::mem::take(&mut state), msg);
        state = next;
        runner.enqueue(effects);

        let view = state.view();
        if state.consume_dirty() {
            for line in ui::render::render(&view) {
                println!("{line}");
            }
        }
        if is_done(&view) {
            return Ok(succeeded(&view));
        }
    }
    Ok(false)
}

fn is_done(view: &AppViewModel) -> bool {
    match view.session {
        SessionState::Finished | SessionState::Failed => true,
        SessionState::Idle => view.tone == StatusTone::Error,
        SessionState::Running | SessionState::Cancelling | SessionState::Packaging => false,
    }
}

fn succeeded(view: &AppViewModel) -> bool {
    view.session == SessionState::Finished && view.tone != StatusTone::Error
}

/// First Ctrl-C cancels the job, a second one exits immediately.
fn spawn_interrupt_listener(msg_tx: mpsc::Sender<Msg>) {
    thread::spawn(move || {
        let runtime = match tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
        {
            Ok(runtime) => runtime,
            Err(err) => {
                engine_warn!("Ctrl-C handling unavailable: {}", err);
                return;
            }
        };
        let mut presses = 0;
        while runtime.block_on(tokio::signal::ctrl_c()).is_ok() {
            presses += 1;
            if presses > 1 {
                std::process::exit(130);
            }
            if msg_tx.send(Msg::CancelRequested).is_err() {
                return;
            }
        }
    });
}
