//! recon-config
//!
//! Environment-variable configuration loading, mirroring the
//! `connect_from_env`/`bind_addr_from_env` style used throughout the
//! daemon and db layers: no deserialization crate, just `std::env::var`
//! plus `anyhow::Context` and explicit range checks at the boundary.

mod config;
mod env;
mod sanitize;

pub use config::{Config, Datasources, StoreConfig, SurfaceConfig, validate_production_datasource};
pub use sanitize::sanitize;
