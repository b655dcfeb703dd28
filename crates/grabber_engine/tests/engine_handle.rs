use std::time::Duration;

use grabber_engine::{EngineConfig, EngineEvent, EngineHandle, JobError, SchedulePolicy};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn drain(handle: EngineHandle) -> Vec<EngineEvent> {
    let mut events = Vec::new();
    while let Some(event) = handle.recv_timeout(Duration::from_secs(20)) {
        let done = matches!(event, EngineEvent::Completed(_));
        events.push(event);
        if done {
            break;
        }
    }
    events
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn handle_reports_started_progress_packaging_completed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"png".to_vec(), "image/png"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let config = EngineConfig {
        proxies: Vec::new(),
        rendered_fallback: false,
        schedule: SchedulePolicy::Ceiling { limit: 2 },
        ..EngineConfig::default()
    };
    let urls = vec![
        format!("{}/ok.png", server.uri()),
        format!("{}/missing.png", server.uri()),
    ];

    let handle = EngineHandle::start(config, urls);
    let events = tokio::task::spawn_blocking(move || drain(handle))
        .await
        .unwrap();

    assert!(matches!(events.first(), Some(EngineEvent::Started { total: 2 })));
    let progress = events
        .iter()
        .filter(|event| matches!(event, EngineEvent::Progress(_)))
        .count();
    assert_eq!(progress, 2);
    assert!(events
        .iter()
        .any(|event| matches!(event, EngineEvent::Packaging { entries: 1 })));

    match events.last() {
        Some(EngineEvent::Completed(Ok(report))) => {
            assert_eq!(report.stats.succeeded(), 1);
            assert_eq!(report.stats.failed(), 1);
            assert_eq!(report.archive.entry_count, 1);
        }
        other => panic!("unexpected final event: {other:?}"),
    }
}

#[test]
fn invalid_config_completes_with_error() {
    let config = EngineConfig {
        task_timeout_ms: 0,
        ..EngineConfig::default()
    };
    let handle = EngineHandle::start(config, vec!["https://x.test/a.png".into()]);
    let events = drain(handle);

    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        EngineEvent::Completed(Err(JobError::Config(_)))
    ));
}
