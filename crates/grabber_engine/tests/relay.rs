use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use grabber_engine::relay::{serve, RelayReply, RelayRequest, RelayServeError};
use grabber_engine::{FailureKind, FetchSettings, ReqwestFetcher};
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fetcher() -> ReqwestFetcher {
    ReqwestFetcher::new(FetchSettings::default()).expect("client")
}

#[tokio::test]
async fn serve_wraps_upstream_body_as_base64() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dog.gif"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(b"GIF89a".to_vec(), "image/gif"))
        .mount(&server)
        .await;

    let reply = serve(
        &fetcher(),
        RelayRequest {
            url: Some(format!("{}/dog.gif", server.uri())),
        },
    )
    .await
    .unwrap();

    assert_eq!(
        reply,
        RelayReply::Image {
            content_type: Some("image/gif".into()),
            data: STANDARD.encode(b"GIF89a"),
        }
    );
}

#[tokio::test]
async fn serve_requires_a_url() {
    for url in [None, Some(String::new()), Some("   ".into())] {
        let err = serve(&fetcher(), RelayRequest { url }).await.unwrap_err();
        assert!(matches!(err, RelayServeError::MissingUrl));
        assert_eq!(err.to_string(), "URL is required");
    }
}

#[tokio::test]
async fn serve_surfaces_upstream_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let err = serve(
        &fetcher(),
        RelayRequest {
            url: Some(format!("{}/gone", server.uri())),
        },
    )
    .await
    .unwrap_err();
    match err {
        RelayServeError::Upstream(fetch) => assert_eq!(fetch.kind, FailureKind::BadStatus(410)),
        other => panic!("unexpected error: {other}"),
    }
}
