//! recon-daemon entry point.
//!
//! This file is intentionally thin: it sets up tracing, loads config,
//! connects every datasource, builds the check catalog and engine, and
//! starts the scheduler and HTTP server. All route handlers live in
//! `routes.rs`; all shared state lives in `state.rs`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{info, Level};

use recon_cache::BalanceCache;
use recon_checks::build_catalog;
use recon_config::Config;
use recon_db::Databases;
use recon_engine::{Catalog, Engine};
use recon_metrics::{MetricsSink, NullMetricsSink, PrometheusMetricsSink};
use recon_store::FileReportStore;
use recon_types::CheckerConfig;

use recon_daemon::{build_router, AppState, Scheduler};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::from_filename(".env.local");
    install_panic_hook();
    init_tracing();

    let config = Config::load().context("loading configuration")?;

    let databases = Databases::connect(
        &config.datasources,
        config.max_open_connections,
        config.max_idle_connections,
    )
    .await
    .context("connecting to databases")?;
    let cache = BalanceCache::connect(&config.datasources.redis_url)
        .await
        .context("connecting to balance cache")?;

    let checker_config = CheckerConfig {
        discrepancy_threshold: config.discrepancy_threshold,
        max_results: config.max_discrepancies_to_report,
        stale_threshold_secs: config.settlement_wait_secs,
    };

    let catalog = Catalog::new(build_catalog(&databases, &cache)).context("building check catalog")?;
    let store = Arc::new(FileReportStore::new(
        config.store.directory.clone(),
        config.store.max_files,
        config.store.retention_days,
    ));

    let metrics: Arc<dyn MetricsSink> = match PrometheusMetricsSink::install() {
        Ok(sink) => Arc::new(sink),
        Err(e) => {
            tracing::warn!(error = %e, "failed to install prometheus recorder, metrics disabled");
            Arc::new(NullMetricsSink)
        }
    };

    let engine = Arc::new(Engine::new(
        catalog,
        Arc::new(databases),
        checker_config,
        config.settlement_wait_secs,
        metrics,
        store.clone(),
    ));

    let shutdown = CancellationToken::new();
    let scheduler = Arc::new(Scheduler::new(
        engine.clone(),
        Duration::from_secs(config.reconciliation_interval_secs),
        Duration::from_secs(config.reconciliation_interval_secs),
    ));
    let scheduler_handle = {
        let scheduler = scheduler.clone();
        let shutdown = shutdown.clone();
        tokio::spawn(async move { scheduler.run_forever(shutdown).await })
    };

    let state = Arc::new(AppState::new(
        engine,
        store,
        config.env_name.clone(),
        config.surface.read_limit_per_minute_per_ip,
        config.surface.trigger_limit_per_minute,
        Duration::from_secs(config.surface.manual_trigger_timeout_secs),
    ));

    let app = build_router(state)
        .layer(RequestBodyLimitLayer::new(config.surface.body_limit_bytes as usize))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let addr = parse_listen_addr(&config.surface.listen_addr)?;
    info!("recon-daemon listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding listen address {addr}"))?;

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(wait_for_shutdown_signal(shutdown.clone()))
    .await
    .context("server crashed")?;

    shutdown.cancel();
    let _ = scheduler_handle.await;

    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// Credential hygiene extends to panic output (spec.md §6): replace the
/// default hook with one that sanitises the panic message before it ever
/// reaches a log line or stderr.
fn install_panic_hook() {
    std::panic::set_hook(Box::new(|info| {
        let sanitized = recon_config::sanitize(&info.to_string());
        tracing::error!("{sanitized}");
    }));
}

/// `RECON_LISTEN_ADDR` follows the `:PORT` convention (listen on every
/// interface) in addition to a full `host:port` address.
fn parse_listen_addr(raw: &str) -> anyhow::Result<SocketAddr> {
    let normalized = match raw.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => raw.to_string(),
    };
    normalized
        .parse()
        .with_context(|| format!("invalid RECON_LISTEN_ADDR {raw:?}"))
}

async fn wait_for_shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install ctrl-c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install sigterm handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    info!("shutdown signal received");
    shutdown.cancel();
}
