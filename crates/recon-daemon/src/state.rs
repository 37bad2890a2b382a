use std::sync::Arc;
use std::time::Duration;

use recon_engine::Engine;
use recon_store::FileReportStore;

use crate::ratelimit::RateLimiter;

/// Static build metadata surfaced by `GET /version`.
#[derive(Clone, Debug)]
pub struct BuildInfo {
    pub service: &'static str,
    pub version: &'static str,
}

/// Shared handle behind every Axum route. Cheap to clone (everything
/// inside is already an `Arc` or `Copy`).
pub struct AppState {
    pub engine: Arc<Engine>,
    pub store: Arc<FileReportStore>,
    pub build: BuildInfo,
    pub env_name: String,
    pub read_limiter: RateLimiter,
    pub trigger_limiter: RateLimiter,
    pub manual_trigger_timeout: Duration,
    /// Hard ceiling on `?limit=` for `GET /reconciliation/reports`,
    /// independent of whatever a caller asks for.
    pub max_reports_limit: usize,
}

impl AppState {
    pub fn new(
        engine: Arc<Engine>,
        store: Arc<FileReportStore>,
        env_name: String,
        read_limit_per_minute_per_ip: u32,
        trigger_limit_per_minute: u32,
        manual_trigger_timeout: Duration,
    ) -> AppState {
        AppState {
            engine,
            store,
            build: BuildInfo {
                service: "recon-daemon",
                version: env!("CARGO_PKG_VERSION"),
            },
            env_name,
            read_limiter: RateLimiter::new(read_limit_per_minute_per_ip, Duration::from_secs(60)),
            trigger_limiter: RateLimiter::new(trigger_limit_per_minute, Duration::from_secs(60)),
            manual_trigger_timeout,
            max_reports_limit: 100,
        }
    }
}
