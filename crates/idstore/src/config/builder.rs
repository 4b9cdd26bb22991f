//! Configuration builder

use std::path::PathBuf;
use std::time::Duration;

use crate::Error;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// JSON identity document to load
    pub source_path: PathBuf,
    /// Background reload period; `None` disables reloading
    pub reload_interval: Option<Duration>,
    pub telemetry: TelemetryConfig,
}

impl Config {
    #[must_use]
    pub const fn builder() -> ConfigBuilder {
        ConfigBuilder::new()
    }

    #[must_use]
    pub const fn reload_interval(&self) -> Option<Duration> {
        self.reload_interval
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Default)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json_logs: bool,
}

/// Configuration builder with fluent API
#[derive(Debug)]
pub struct ConfigBuilder {
    source_path: Option<PathBuf>,
    reload_interval: Duration,
    telemetry: TelemetryConfig,
}

impl ConfigBuilder {
    pub const DEFAULT_RELOAD_INTERVAL: Duration = Duration::from_secs(60);

    #[must_use]
    pub const fn new() -> Self {
        Self {
            source_path: None,
            reload_interval: Self::DEFAULT_RELOAD_INTERVAL,
            telemetry: TelemetryConfig {
                log_level: String::new(),
                json_logs: false,
            },
        }
    }

    #[must_use]
    pub fn source_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source_path = Some(path.into());
        self
    }

    /// Set the reload period; zero disables background reloads
    #[must_use]
    pub const fn reload_interval(mut self, interval: Duration) -> Self {
        self.reload_interval = interval;
        self
    }

    #[must_use]
    pub fn log_level(mut self, level: String) -> Self {
        self.telemetry.log_level = level;
        self
    }

    #[must_use]
    pub const fn json_logs(mut self, enabled: bool) -> Self {
        self.telemetry.json_logs = enabled;
        self
    }

    /// Telemetry settings with defaults applied
    #[must_use]
    pub fn telemetry(&self) -> TelemetryConfig {
        let log_level = if self.telemetry.log_level.is_empty() {
            "info".to_string()
        } else {
            self.telemetry.log_level.clone()
        };

        TelemetryConfig {
            log_level,
            json_logs: self.telemetry.json_logs,
        }
    }

    /// Build the configuration
    pub fn build(self) -> crate::Result<Config> {
        let telemetry = self.telemetry();

        let source_path = self
            .source_path
            .ok_or_else(|| Error::Config("source path is required".into()))?;

        let reload_interval = (!self.reload_interval.is_zero()).then_some(self.reload_interval);

        Ok(Config {
            source_path,
            reload_interval,
            telemetry,
        })
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
