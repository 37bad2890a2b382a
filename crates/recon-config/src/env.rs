use anyhow::{bail, Context, Result};

pub fn var(name: &str) -> Result<String> {
    std::env::var(name).with_context(|| format!("missing env var {name}"))
}

pub fn var_opt(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

pub fn var_or(name: &str, default: &str) -> String {
    var_opt(name).unwrap_or_else(|| default.to_string())
}

pub fn parse_u64_or(name: &str, default: u64) -> Result<u64> {
    match var_opt(name) {
        None => Ok(default),
        Some(v) => v
            .parse::<u64>()
            .with_context(|| format!("{name}={v:?} is not a non-negative integer")),
    }
}

pub fn parse_i64_or(name: &str, default: i64) -> Result<i64> {
    match var_opt(name) {
        None => Ok(default),
        Some(v) => v
            .parse::<i64>()
            .with_context(|| format!("{name}={v:?} is not an integer")),
    }
}

pub fn parse_usize_or(name: &str, default: usize) -> Result<usize> {
    match var_opt(name) {
        None => Ok(default),
        Some(v) => v
            .parse::<usize>()
            .with_context(|| format!("{name}={v:?} is not a non-negative integer")),
    }
}

pub fn require_range_u64(name: &str, value: u64, min: u64, max: u64) -> Result<u64> {
    if value < min || value > max {
        bail!("{name}={value} must be in [{min}, {max}]");
    }
    Ok(value)
}

pub fn require_range_usize(name: &str, value: usize, min: usize, max: usize) -> Result<usize> {
    if value < min || value > max {
        bail!("{name}={value} must be in [{min}, {max}]");
    }
    Ok(value)
}
