use anyhow::{bail, Context, Result};

use crate::env::{
    parse_i64_or, parse_u64_or, parse_usize_or, require_range_u64, require_range_usize, var,
    var_opt, var_or,
};

/// Datasource connection strings the checks read from. Kept as opaque
/// strings here (validated for `sslmode` only); the actual `connect()` is
/// `recon-db`/`recon-cache`'s job.
#[derive(Clone, Debug)]
pub struct Datasources {
    pub onboarding_db_url: String,
    pub transaction_db_url: String,
    pub metadata_db_url: String,
    pub redis_url: String,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub directory: std::path::PathBuf,
    /// 0 disables the max-files retention policy.
    pub max_files: usize,
    /// 0 disables the age-based retention policy.
    pub retention_days: u32,
}

#[derive(Clone, Debug)]
pub struct SurfaceConfig {
    pub listen_addr: String,
    pub read_limit_per_minute_per_ip: u32,
    pub trigger_limit_per_minute: u32,
    pub body_limit_bytes: u64,
    pub read_timeout_secs: u64,
    pub write_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub manual_trigger_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub env_name: String,
    pub reconciliation_interval_secs: u64,
    pub settlement_wait_secs: u64,
    pub discrepancy_threshold: i64,
    pub max_discrepancies_to_report: usize,
    pub max_open_connections: u32,
    pub max_idle_connections: u32,
    pub datasources: Datasources,
    pub store: StoreConfig,
    pub surface: SurfaceConfig,
}

impl Config {
    /// Load `.env.local` if present (dev convenience, silent if absent —
    /// production injects env vars directly), then build the typed config
    /// from the process environment.
    pub fn load() -> Result<Config> {
        let _ = dotenvy::from_filename(".env.local");
        Config::from_env()
    }

    pub fn from_env() -> Result<Config> {
        let env_name = var_or("ENV_NAME", "development");

        let reconciliation_interval_secs =
            parse_u64_or("RECONCILIATION_INTERVAL_SECONDS", 300)?;
        require_range_u64(
            "RECONCILIATION_INTERVAL_SECONDS",
            reconciliation_interval_secs,
            60,
            u64::MAX,
        )?;

        let settlement_wait_secs = parse_u64_or("SETTLEMENT_WAIT_SECONDS", 300)?;

        let discrepancy_threshold = parse_i64_or("DISCREPANCY_THRESHOLD", 0)?;

        let max_discrepancies_to_report =
            parse_usize_or("MAX_DISCREPANCIES_TO_REPORT", 100)?;
        require_range_usize(
            "MAX_DISCREPANCIES_TO_REPORT",
            max_discrepancies_to_report,
            1,
            1000,
        )?;

        let max_open_connections = parse_u64_or("MAX_OPEN_CONNECTIONS", 10)? as u32;
        require_range_u64("MAX_OPEN_CONNECTIONS", max_open_connections as u64, 1, 100)?;
        let max_idle_connections = parse_u64_or("MAX_IDLE_CONNECTIONS", 5)? as u32;
        require_range_u64("MAX_IDLE_CONNECTIONS", max_idle_connections as u64, 1, 100)?;

        let datasources = Datasources {
            onboarding_db_url: var("RECON_ONBOARDING_DATABASE_URL")?,
            transaction_db_url: var("RECON_TRANSACTION_DATABASE_URL")?,
            metadata_db_url: var("RECON_METADATA_DATABASE_URL")?,
            redis_url: var("RECON_REDIS_URL")?,
        };

        if env_name == "production" {
            reject_sslmode_disable("RECON_ONBOARDING_DATABASE_URL", &datasources.onboarding_db_url)?;
            reject_sslmode_disable(
                "RECON_TRANSACTION_DATABASE_URL",
                &datasources.transaction_db_url,
            )?;
            reject_sslmode_disable("RECON_METADATA_DATABASE_URL", &datasources.metadata_db_url)?;
        }

        let store = StoreConfig {
            directory: var_opt("RECON_STORE_DIR")
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|| std::path::PathBuf::from("./reconciliation_reports")),
            max_files: parse_usize_or("RECON_STORE_MAX_FILES", 500)?,
            retention_days: parse_u64_or("RECON_STORE_RETENTION_DAYS", 30)? as u32,
        };

        let surface = SurfaceConfig {
            listen_addr: var_or("RECON_LISTEN_ADDR", ":3005"),
            read_limit_per_minute_per_ip: parse_u64_or("RECON_READ_LIMIT_PER_MINUTE", 60)? as u32,
            trigger_limit_per_minute: parse_u64_or("RECON_TRIGGER_LIMIT_PER_MINUTE", 1)? as u32,
            body_limit_bytes: parse_u64_or("RECON_BODY_LIMIT_BYTES", 1024 * 1024)?,
            read_timeout_secs: parse_u64_or("RECON_READ_TIMEOUT_SECONDS", 30)?,
            write_timeout_secs: parse_u64_or("RECON_WRITE_TIMEOUT_SECONDS", 30)?,
            idle_timeout_secs: parse_u64_or("RECON_IDLE_TIMEOUT_SECONDS", 60)?,
            manual_trigger_timeout_secs: {
                let v = parse_u64_or("RECON_MANUAL_TRIGGER_TIMEOUT_SECONDS", 60)?;
                require_range_u64("RECON_MANUAL_TRIGGER_TIMEOUT_SECONDS", v, 60, u64::MAX)?
            },
        };

        Ok(Config {
            env_name,
            reconciliation_interval_secs,
            settlement_wait_secs,
            discrepancy_threshold,
            max_discrepancies_to_report,
            max_open_connections,
            max_idle_connections,
            datasources,
            store,
            surface,
        })
    }
}

/// In production, a datasource declared with `sslmode=disable` is rejected
/// at startup (spec.md §6).
fn reject_sslmode_disable(name: &str, url: &str) -> Result<()> {
    if url.contains("sslmode=disable") {
        bail!(
            "{name} is configured with sslmode=disable, which is not permitted when ENV_NAME=production"
        );
    }
    Ok(())
}

/// Convenience used by callers that only need the sslmode guard outside of
/// full config construction (e.g. a CLI subcommand validating one URL).
pub fn validate_production_datasource(env_name: &str, name: &str, url: &str) -> Result<()> {
    if env_name == "production" {
        reject_sslmode_disable(name, url).with_context(|| "startup datasource validation failed")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_recon_env() {
        for (k, _) in std::env::vars() {
            if k.starts_with("RECON_") || k == "ENV_NAME" {
                std::env::remove_var(k);
            }
        }
    }

    #[test]
    fn rejects_interval_below_60() {
        let _g = ENV_LOCK.lock().unwrap();
        clear_recon_env();
        std::env::set_var("RECONCILIATION_INTERVAL_SECONDS", "10");
        std::env::set_var("RECON_ONBOARDING_DATABASE_URL", "postgres://x/y");
        std::env::set_var("RECON_TRANSACTION_DATABASE_URL", "postgres://x/y");
        std::env::set_var("RECON_METADATA_DATABASE_URL", "postgres://x/y");
        std::env::set_var("RECON_REDIS_URL", "redis://x");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("RECONCILIATION_INTERVAL_SECONDS"));
        clear_recon_env();
    }

    #[test]
    fn production_rejects_sslmode_disable() {
        let _g = ENV_LOCK.lock().unwrap();
        clear_recon_env();
        std::env::set_var("ENV_NAME", "production");
        std::env::set_var(
            "RECON_ONBOARDING_DATABASE_URL",
            "postgres://x/y?sslmode=disable",
        );
        std::env::set_var("RECON_TRANSACTION_DATABASE_URL", "postgres://x/y");
        std::env::set_var("RECON_METADATA_DATABASE_URL", "postgres://x/y");
        std::env::set_var("RECON_REDIS_URL", "redis://x");
        let err = Config::from_env().unwrap_err();
        assert!(err.to_string().contains("sslmode=disable"));
        clear_recon_env();
    }

    #[test]
    fn defaults_apply_when_unset() {
        let _g = ENV_LOCK.lock().unwrap();
        clear_recon_env();
        std::env::set_var("RECON_ONBOARDING_DATABASE_URL", "postgres://x/y");
        std::env::set_var("RECON_TRANSACTION_DATABASE_URL", "postgres://x/y");
        std::env::set_var("RECON_METADATA_DATABASE_URL", "postgres://x/y");
        std::env::set_var("RECON_REDIS_URL", "redis://x");
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.reconciliation_interval_secs, 300);
        assert_eq!(cfg.max_discrepancies_to_report, 100);
        assert_eq!(cfg.surface.manual_trigger_timeout_secs, 60);
        clear_recon_env();
    }
}
