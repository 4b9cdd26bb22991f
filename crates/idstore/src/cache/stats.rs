//! Load reports and cache statistics

use std::time::{Duration, SystemTime};

use serde::Serialize;

/// Summary of one successful load
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LoadReport {
    /// Monotonic snapshot generation, starting at 1
    pub generation: u64,
    pub callers: usize,
    pub groups: usize,
    pub roles: usize,
    /// Records dropped during ingestion (e.g. empty names)
    pub skipped: usize,
}

/// Cache statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub loads: u64,
    pub failed_loads: u64,
    /// Generation of the active snapshot, `None` before the first load
    pub generation: Option<u64>,
    pub callers: usize,
    pub groups: usize,
    pub roles: usize,
    pub last_loaded: Option<SystemTime>,
}

impl CacheStats {
    /// Fraction of load attempts that failed
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn failure_rate(&self) -> f64 {
        let attempts = self.loads + self.failed_loads;
        if attempts == 0 {
            0.0
        } else {
            self.failed_loads as f64 / attempts as f64
        }
    }

    /// Time since the active snapshot was published
    #[must_use]
    pub fn age(&self) -> Option<Duration> {
        self.last_loaded.and_then(|t| t.elapsed().ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_rate_empty() {
        let stats = CacheStats::default();
        assert!((stats.failure_rate() - 0.0).abs() < f64::EPSILON);
        assert!(stats.age().is_none());
    }

    #[test]
    fn test_failure_rate() {
        let stats = CacheStats {
            loads: 3,
            failed_loads: 1,
            ..Default::default()
        };
        assert!((stats.failure_rate() - 0.25).abs() < f64::EPSILON);
    }

    #[test]
    fn test_age() {
        let stats = CacheStats {
            last_loaded: Some(SystemTime::now()),
            ..Default::default()
        };
        assert!(stats.age().unwrap() < Duration::from_secs(60));
    }

    #[test]
    fn test_load_report_serialize() {
        let report = LoadReport {
            generation: 2,
            callers: 3,
            groups: 4,
            roles: 5,
            skipped: 1,
        };
        let json = serde_json::to_value(report).unwrap();
        assert_eq!(json["generation"], 2);
        assert_eq!(json["skipped"], 1);
    }
}
