use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

/// Bare `oneshot` calls bypass `into_make_service_with_connect_info`, so
/// every request through the read-rate-limited routes needs this
/// extension inserted by hand.
fn peer() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 0))
}

use recon_daemon::{build_router, AppState};
use recon_engine::{Catalog, Engine};
use recon_metrics::NullMetricsSink;
use recon_store::FileReportStore;
use recon_testkit::{FakeCheck, FakeProbes};
use recon_types::{CheckName, CheckerConfig, Severity};

fn build_state(dir: &std::path::Path, checks: Vec<Box<dyn recon_types::Check>>) -> Arc<AppState> {
    let catalog = Catalog::new(checks).unwrap();
    let store = Arc::new(FileReportStore::new(dir, 0, 0));
    let engine = Arc::new(Engine::new(
        catalog,
        Arc::new(FakeProbes::default()),
        CheckerConfig::default(),
        300,
        Arc::new(NullMetricsSink),
        store.clone(),
    ));
    Arc::new(AppState::new(
        engine,
        store,
        "test".to_string(),
        60,
        1,
        Duration::from_secs(5),
    ))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_always_ok() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(dir.path(), vec![Box::new(FakeCheck::healthy(CheckName::Balance))]);
    let app = build_router(state);

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn status_is_unknown_before_any_run() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(dir.path(), vec![Box::new(FakeCheck::healthy(CheckName::Balance))]);
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reconciliation/status")
                .extension(ConnectInfo(peer()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "UNKNOWN");
}

#[tokio::test]
async fn manual_run_publishes_and_returns_the_report() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(dir.path(), vec![Box::new(FakeCheck::healthy(CheckName::Balance))]);
    let app = build_router(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reconciliation/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "HEALTHY");

    let status_response = app
        .oneshot(
            Request::builder()
                .uri("/reconciliation/status")
                .extension(ConnectInfo(peer()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(status_response.status(), StatusCode::OK);
}

#[tokio::test]
async fn second_manual_trigger_within_the_window_is_rate_limited() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(dir.path(), vec![Box::new(FakeCheck::healthy(CheckName::Balance))]);
    let app = build_router(state);

    let first = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reconciliation/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);

    let second = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reconciliation/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn reports_endpoint_rejects_non_positive_limit() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(dir.path(), vec![Box::new(FakeCheck::healthy(CheckName::Balance))]);
    let app = build_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/reconciliation/reports?limit=0")
                .extension(ConnectInfo(peer()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn critical_status_surfaces_as_service_unavailable() {
    let dir = tempfile::tempdir().unwrap();
    let state = build_state(
        dir.path(),
        vec![Box::new(FakeCheck::new(CheckName::Balance, Severity::Critical))],
    );
    let app = build_router(state);

    let run = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/reconciliation/run")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(run.status(), StatusCode::OK);

    let status = app
        .oneshot(
            Request::builder()
                .uri("/reconciliation/status")
                .extension(ConnectInfo(peer()))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(status.status(), StatusCode::SERVICE_UNAVAILABLE);
}
