use grabber_core::{
    update, AppState, Effect, JobLedger, JobStats, Msg, Outcome, SessionState, StatusTone,
};
use pretty_assertions::assert_eq;

fn settled_stats(successes: usize, failures: usize) -> JobStats {
    let total = successes + failures;
    let mut ledger = JobLedger::new((0..total).map(|i| format!("https://x/{i}.png")));
    for index in 0..total {
        ledger.dispatch(index).unwrap();
        let outcome = if index < successes {
            Outcome::Succeeded
        } else {
            Outcome::Failed
        };
        ledger.settle(index, outcome).unwrap();
    }
    ledger.stats()
}

fn running(urls: &[&str]) -> AppState {
    let (state, effects) = update(
        AppState::new(),
        Msg::UrlsLoaded(urls.iter().map(|u| u.to_string()).collect()),
    );
    assert_eq!(effects.len(), 1);
    state
}

#[test]
fn loading_urls_trims_blanks_and_starts_job() {
    let (mut state, effects) = update(
        AppState::new(),
        Msg::UrlsLoaded(vec![
            " https://a.example.com/1.png ".into(),
            "".into(),
            "   ".into(),
            "https://b.example.com/2.gif".into(),
        ]),
    );

    assert_eq!(
        effects,
        vec![Effect::StartJob {
            urls: vec![
                "https://a.example.com/1.png".to_string(),
                "https://b.example.com/2.gif".to_string(),
            ],
        }]
    );
    let view = state.view();
    assert_eq!(view.session, SessionState::Running);
    assert_eq!(view.status_text, "Downloading 2 images...");
    assert_eq!(view.tone, StatusTone::Downloading);
    assert_eq!(view.percent, 0);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn empty_input_stays_idle() {
    let (state, effects) = update(AppState::new(), Msg::UrlsLoaded(vec![" ".into()]));
    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);
    assert_eq!(state.view().status_text, "No image URLs found");
}

#[test]
fn progress_updates_status_and_percent() {
    let state = running(&["a", "b", "c", "d"]);
    let mut ledger = JobLedger::new(["a", "b", "c", "d"]);
    ledger.dispatch(2).unwrap();
    let stats = ledger.settle(2, Outcome::Succeeded).unwrap();

    let (state, effects) = update(state, Msg::Progress(stats));
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.status_text, "Processing: 1/4 (1 successful)");
    assert_eq!(view.percent, 25);
}

#[test]
fn finishing_with_failures_is_a_warning() {
    let state = running(&["a", "b", "c"]);
    let (state, _) = update(state, Msg::Packaging);
    assert_eq!(state.view().status_text, "Creating ZIP file...");
    assert_eq!(state.view().tone, StatusTone::Zipping);

    let (state, _) = update(
        state,
        Msg::JobFinished {
            stats: settled_stats(2, 1),
            archive_path: "out/images_1.zip".into(),
        },
    );
    let view = state.view();
    assert_eq!(view.session, SessionState::Finished);
    assert_eq!(view.status_text, "Complete! 2 downloaded, 1 failed");
    assert_eq!(view.tone, StatusTone::Warning);
    assert_eq!(view.archive_path.as_deref(), Some("out/images_1.zip"));
}

#[test]
fn finishing_clean_is_complete() {
    let state = running(&["a"]);
    let (state, _) = update(
        state,
        Msg::JobFinished {
            stats: settled_stats(1, 0),
            archive_path: "x.zip".into(),
        },
    );
    assert_eq!(state.view().tone, StatusTone::Complete);
}

#[test]
fn all_failed_job_surfaces_as_error() {
    let state = running(&["a", "b"]);
    let (state, _) = update(
        state,
        Msg::JobFinished {
            stats: settled_stats(0, 2),
            archive_path: "x.zip".into(),
        },
    );
    let view = state.view();
    assert_eq!(view.session, SessionState::Failed);
    assert_eq!(view.tone, StatusTone::Error);
    assert_eq!(view.status_text, "No images could be downloaded (2 failed)");
}

#[test]
fn archive_failure_keeps_partial_counts() {
    let state = running(&["a", "b", "c"]);
    let stats = settled_stats(2, 1);
    let (state, _) = update(
        state,
        Msg::JobFailed {
            stats,
            message: "disk full".into(),
        },
    );
    let view = state.view();
    assert_eq!(view.status_text, "Error creating ZIP: disk full");
    assert_eq!(view.stats, Some(stats));
    assert_eq!(view.session, SessionState::Failed);
}

#[test]
fn engine_failure_is_not_reported_as_a_zip_error() {
    let state = running(&["a", "b"]);
    let (state, effects) = update(
        state,
        Msg::EngineFailed {
            message: "engine runtime unavailable: no threads".into(),
        },
    );
    assert!(effects.is_empty());
    let view = state.view();
    assert_eq!(view.session, SessionState::Failed);
    assert_eq!(view.tone, StatusTone::Error);
    assert_eq!(
        view.status_text,
        "Engine error: engine runtime unavailable: no threads"
    );
}

#[test]
fn cancel_only_applies_while_running() {
    let (state, effects) = update(AppState::new(), Msg::CancelRequested);
    assert!(effects.is_empty());
    assert_eq!(state.session(), SessionState::Idle);

    let state = running(&["a"]);
    let (state, effects) = update(state, Msg::CancelRequested);
    assert_eq!(effects, vec![Effect::CancelJob]);
    assert_eq!(state.session(), SessionState::Cancelling);

    let (_, effects) = update(state, Msg::CancelRequested);
    assert!(effects.is_empty());
}

#[test]
fn second_url_batch_is_ignored_while_running() {
    let state = running(&["a"]);
    let (state, effects) = update(state, Msg::UrlsLoaded(vec!["b".into()]));
    assert!(effects.is_empty());
    assert_eq!(state.stats().map(|s| s.total()), Some(1));
}
