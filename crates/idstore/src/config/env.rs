//! Environment variable loading for configuration

use std::env;
use std::time::Duration;

use super::builder::ConfigBuilder;
use crate::Result;

/// Environment variable names
mod vars {
    pub const IDSTORE_SOURCE: &str = "IDSTORE_SOURCE";
    pub const IDSTORE_RELOAD_INTERVAL_SECS: &str = "IDSTORE_RELOAD_INTERVAL_SECS";
    pub const IDSTORE_JSON_LOGS: &str = "IDSTORE_JSON_LOGS";
    pub const RUST_LOG: &str = "RUST_LOG";
}

/// Load configuration from environment variables
pub fn load_from_env(mut builder: ConfigBuilder) -> Result<ConfigBuilder> {
    if let Ok(path) = env::var(vars::IDSTORE_SOURCE)
        && !path.is_empty()
    {
        builder = builder.source_path(path);
    }

    if let Ok(secs_str) = env::var(vars::IDSTORE_RELOAD_INTERVAL_SECS) {
        let secs = secs_str.trim().parse::<u64>().map_err(|e| {
            crate::Error::Config(format!(
                "Invalid {}: {}",
                vars::IDSTORE_RELOAD_INTERVAL_SECS,
                e
            ))
        })?;
        builder = builder.reload_interval(Duration::from_secs(secs));
    }

    if let Ok(level) = env::var(vars::RUST_LOG) {
        builder = builder.log_level(level);
    }

    if let Ok(val) = env::var(vars::IDSTORE_JSON_LOGS) {
        builder = builder.json_logs(parse_bool(&val));
    }

    Ok(builder)
}

fn parse_bool(s: &str) -> bool {
    matches!(s.to_lowercase().as_str(), "true" | "1" | "yes" | "on")
}
