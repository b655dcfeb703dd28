//! HTTP front for the relay pass-through: `POST /proxy` with `{url}`.

use std::sync::Arc;

use anyhow::Context;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{Method, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use engine_logging::{engine_info, engine_warn};
use grabber_engine::relay::{self, RelayReply, RelayRequest, RelayServeError};
use grabber_engine::{EngineConfig, Fetcher, ReqwestFetcher};
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

type SharedFetcher = Arc<dyn Fetcher>;

pub fn run(listen: &str) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting tokio runtime")?;
    runtime.block_on(serve(listen))
}

async fn serve(listen: &str) -> anyhow::Result<()> {
    let fetcher = ReqwestFetcher::new(EngineConfig::default().fetch_settings())
        .context("building http client")?;
    let listener = TcpListener::bind(listen)
        .await
        .with_context(|| format!("binding {listen}"))?;
    engine_info!("relay listening on http://{}/proxy", listener.local_addr()?);

    axum::serve(listener, router(Arc::new(fetcher)))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            engine_info!("relay shutting down");
        })
        .await
        .context("relay server failed")
}

pub fn router(fetcher: SharedFetcher) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers(Any);
    Router::new()
        .route("/proxy", post(proxy))
        .layer(cors)
        .with_state(fetcher)
}

async fn proxy(State(fetcher): State<SharedFetcher>, body: Bytes) -> (StatusCode, Json<RelayReply>) {
    // An unparseable body is treated like one without a url.
    let request: RelayRequest = serde_json::from_slice(&body).unwrap_or_default();
    match relay::serve(fetcher.as_ref(), request).await {
        Ok(reply) => (StatusCode::OK, Json(reply)),
        Err(RelayServeError::MissingUrl) => (
            StatusCode::BAD_REQUEST,
            Json(RelayReply::error(RelayServeError::MissingUrl.to_string())),
        ),
        Err(RelayServeError::Upstream(err)) => {
            engine_warn!("relay upstream failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(RelayReply::error(err.to_string())),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use grabber_engine::FetchSettings;
    use pretty_assertions::assert_eq;
    use serde_json::{json, Value};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn app() -> Router {
        router(Arc::new(
            ReqwestFetcher::new(FetchSettings::default()).unwrap(),
        ))
    }

    fn post_json(body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/proxy")
            .header("content-type", "application/json")
            .header("origin", "https://app.example.com")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn relays_image_as_base64() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/a.png"))
            .respond_with(ResponseTemplate::new(200).set_body_raw(b"hi".to_vec(), "image/png"))
            .mount(&server)
            .await;

        let body = json!({ "url": format!("{}/a.png", server.uri()) }).to_string();
        let response = app().oneshot(post_json(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()["access-control-allow-origin"],
            "*"
        );
        assert_eq!(
            json_body(response).await,
            json!({ "contentType": "image/png", "data": "aGk=" })
        );
    }

    #[tokio::test]
    async fn missing_url_is_a_bad_request() {
        for body in ["{}", "not json", r#"{"url": ""}"#] {
            let response = app().oneshot(post_json(body)).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
            assert_eq!(
                json_body(response).await,
                json!({ "error": "URL is required" })
            );
        }
    }

    #[tokio::test]
    async fn upstream_failure_is_a_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let body = json!({ "url": format!("{}/down.png", server.uri()) }).to_string();
        let response = app().oneshot(post_json(&body)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let reply = json_body(response).await;
        assert!(reply["error"].as_str().unwrap().contains("503"));
    }

    #[tokio::test]
    async fn other_methods_are_rejected() {
        let request = Request::builder()
            .method("GET")
            .uri("/proxy")
            .body(Body::empty())
            .unwrap();
        let response = app().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
    }
}
