//! Axum router and HTTP handlers for the reconciliation status surface
//! (spec.md §4.9). `build_router` is the single entry point; `main.rs`
//! calls it and attaches middleware layers so scenario tests in `tests/`
//! can compose the bare router directly.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{ConnectInfo, Query, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;

use crate::api_types::{
    ErrorResponse, HealthResponse, ReportsResponse, StatusResponse, VersionResponse,
};
use crate::state::AppState;

pub fn build_router(state: Arc<AppState>) -> Router {
    let reads = Router::new()
        .route("/reconciliation/status", get(reconciliation_status))
        .route("/reconciliation/report", get(reconciliation_report))
        .route("/reconciliation/reports", get(reconciliation_reports))
        .layer(middleware::from_fn_with_state(state.clone(), read_rate_limit));

    Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .route("/reconciliation/run", post(reconciliation_run))
        .merge(reads)
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    (StatusCode::OK, Json(HealthResponse { status: "ok" }))
}

async fn version(State(st): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(VersionResponse {
            service: st.build.service,
            version: st.build.version,
            env: st.env_name.clone(),
        }),
    )
}

/// `60/min/IP` on the three read endpoints (spec.md §6). Applied as
/// middleware rather than inline in each handler so the limit can't be
/// forgotten on a new route.
async fn read_rate_limit(
    State(st): State<Arc<AppState>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: axum::extract::Request,
    next: Next,
) -> Response {
    if !st.read_limiter.check(&addr.ip().to_string()) {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new("read rate limit exceeded")),
        )
            .into_response();
    }
    next.run(req).await
}

async fn reconciliation_status(State(st): State<Arc<AppState>>) -> Response {
    let Some(report) = st.engine.last_report().await else {
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(StatusResponse {
                status: recon_types::Severity::Unknown.to_string(),
                run_id: None,
                timestamp: None,
                status_changed: false,
                checks: Default::default(),
            }),
        )
            .into_response();
    };

    let checks = report
        .checks
        .iter()
        .map(|(name, outcome)| (name.clone(), outcome.status().to_string()))
        .collect();

    let body = StatusResponse {
        status: report.status.to_string(),
        run_id: Some(report.run_id),
        timestamp: Some(report.timestamp),
        status_changed: report.status_changed,
        checks,
    };

    let code = match report.status {
        recon_types::Severity::Critical | recon_types::Severity::Error => {
            StatusCode::SERVICE_UNAVAILABLE
        }
        _ => StatusCode::OK,
    };
    (code, Json(body)).into_response()
}

/// Full latest report. Falls back to the on-disk store only when the
/// process has not completed a run since startup (cold-start window).
async fn reconciliation_report(State(st): State<Arc<AppState>>) -> Response {
    if let Some(report) = st.engine.last_report().await {
        return (StatusCode::OK, Json((*report).clone())).into_response();
    }

    match st.store.load_latest().await {
        Ok(Some(report)) => (StatusCode::OK, Json(report)).into_response(),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("no reconciliation report has been produced yet")),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "falling back to not-found after a report store read failure");
            (
                StatusCode::NOT_FOUND,
                Json(ErrorResponse::new("no reconciliation report has been produced yet")),
            )
                .into_response()
        }
    }
}

#[derive(Deserialize)]
struct ReportsQuery {
    limit: Option<i64>,
}

async fn reconciliation_reports(
    State(st): State<Arc<AppState>>,
    Query(query): Query<ReportsQuery>,
) -> Response {
    let requested = query.limit.unwrap_or(20);
    if requested <= 0 {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("limit must be a positive integer")),
        )
            .into_response();
    }
    let limit = (requested as usize).min(st.max_reports_limit);

    match st.store.load_recent(limit).await {
        Ok(reports) => (
            StatusCode::OK,
            Json(ReportsResponse {
                count: reports.len(),
                reports,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::warn!(error = %e, "report store listing failed; falling back to the in-memory last report");
            let reports = st.engine.last_report().await.map(|r| vec![(*r).clone()]).unwrap_or_default();
            (
                StatusCode::OK,
                Json(ReportsResponse {
                    count: reports.len(),
                    reports,
                }),
            )
                .into_response()
        }
    }
}

/// `1/min` global (spec.md §4.9/§6). Runs the engine directly rather than
/// merely flagging the scheduler, so the caller gets the fresh report back
/// in the response body.
async fn reconciliation_run(State(st): State<Arc<AppState>>) -> Response {
    if !st.trigger_limiter.check("global") {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorResponse::new("manual trigger rate limit exceeded")),
        )
            .into_response();
    }

    let engine = st.engine.clone();
    let deadline = st.manual_trigger_timeout;
    let handle = tokio::spawn(async move { engine.run(deadline).await });

    match tokio::time::timeout(deadline, handle).await {
        Ok(Ok(report)) => (StatusCode::OK, Json((*report).clone())).into_response(),
        Ok(Err(join_err)) => {
            tracing::error!(error = %join_err, "manual reconciliation run task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("reconciliation run failed")),
            )
                .into_response()
        }
        Err(_elapsed) => (
            StatusCode::GATEWAY_TIMEOUT,
            Json(ErrorResponse::new("reconciliation run exceeded its deadline")),
        )
            .into_response(),
    }
}
