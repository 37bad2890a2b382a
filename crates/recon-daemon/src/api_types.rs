//! Response bodies for the HTTP status surface. Kept separate from
//! `routes.rs` so the shapes are easy to scan without the handler bodies.

use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[derive(Serialize)]
pub struct VersionResponse {
    pub service: &'static str,
    pub version: &'static str,
    pub env: String,
}

/// GET /reconciliation/status: the cheap, DB-free view of the last
/// published report. `UNKNOWN` (with a 503) before the first run publishes.
#[derive(Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub run_id: Option<Uuid>,
    pub timestamp: Option<chrono::DateTime<chrono::Utc>>,
    pub status_changed: bool,
    pub checks: BTreeMap<String, String>,
}

#[derive(Serialize)]
pub struct ReportsResponse {
    pub count: usize,
    pub reports: Vec<recon_report::Report>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(msg: impl Into<String>) -> ErrorResponse {
        ErrorResponse { error: msg.into() }
    }
}
