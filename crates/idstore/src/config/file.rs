//! TOML configuration file loading

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::builder::ConfigBuilder;
use crate::Result;

/// Configuration file locations checked in order
const CONFIG_PATHS: &[&str] = &[
    "./idstore.toml",
    "~/.config/idstore/config.toml",
    "/etc/idstore/config.toml",
];

/// Find the first existing configuration file
pub fn find_config_file() -> Option<PathBuf> {
    for path_str in CONFIG_PATHS {
        let path = if path_str.starts_with('~') {
            if let Ok(home) = std::env::var("HOME") {
                PathBuf::from(path_str.replacen('~', &home, 1))
            } else {
                continue;
            }
        } else {
            PathBuf::from(path_str)
        };

        if path.exists() {
            return Some(path);
        }
    }
    None
}

/// Load configuration from a TOML file
pub fn load_from_file(path: &Path, builder: ConfigBuilder) -> Result<ConfigBuilder> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to read config file {}: {}",
            path.display(),
            e
        ))
    })?;

    let file_config: FileConfig = toml::from_str(&content).map_err(|e| {
        crate::Error::Config(format!(
            "Failed to parse config file {}: {}",
            path.display(),
            e
        ))
    })?;

    Ok(apply_file_config(builder, file_config, path))
}

fn apply_file_config(mut builder: ConfigBuilder, config: FileConfig, origin: &Path) -> ConfigBuilder {
    if let Some(source) = config.source
        && let Some(path) = source.path
    {
        // Relative source paths resolve against the config file's directory
        let path = match origin.parent() {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path,
        };
        builder = builder.source_path(path);
    }

    if let Some(reload) = config.reload
        && let Some(secs) = reload.interval_secs
    {
        builder = builder.reload_interval(Duration::from_secs(secs));
    }

    if let Some(obs) = config.observability {
        if let Some(level) = obs.log_level {
            builder = builder.log_level(level);
        }

        if let Some(json) = obs.json_logs {
            builder = builder.json_logs(json);
        }
    }

    builder
}

/// Root configuration file structure
#[derive(Debug, Deserialize, Default)]
struct FileConfig {
    source: Option<SourceConfig>,
    reload: Option<ReloadConfig>,
    observability: Option<ObservabilityConfig>,
}

#[derive(Debug, Deserialize)]
struct SourceConfig {
    path: Option<PathBuf>,
}

#[derive(Debug, Deserialize)]
struct ReloadConfig {
    interval_secs: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct ObservabilityConfig {
    log_level: Option<String>,
    json_logs: Option<bool>,
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempfile::NamedTempFile;

    use super::*;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[source]
path = "/var/lib/idstore/callers.json"

[reload]
interval_secs = 30

[observability]
log_level = "debug"
json_logs = true
"#;

        let config: FileConfig = toml::from_str(toml_content).unwrap();

        assert_eq!(
            config.source.unwrap().path,
            Some(PathBuf::from("/var/lib/idstore/callers.json"))
        );
        assert_eq!(config.reload.unwrap().interval_secs, Some(30));

        let obs = config.observability.unwrap();
        assert_eq!(obs.log_level, Some("debug".to_string()));
        assert_eq!(obs.json_logs, Some(true));
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: FileConfig = toml::from_str("[source]\npath = \"callers.json\"\n").unwrap();
        assert!(config.source.is_some());
        assert!(config.reload.is_none());
        assert!(config.observability.is_none());
    }

    #[test]
    fn test_load_from_file_success() {
        let toml_content = r#"
[source]
path = "/var/lib/idstore/callers.json"

[reload]
interval_secs = 5
"#;
        let temp_file = create_temp_config(toml_content);

        let config = load_from_file(temp_file.path(), ConfigBuilder::new())
            .unwrap()
            .build()
            .unwrap();

        assert_eq!(
            config.source_path,
            PathBuf::from("/var/lib/idstore/callers.json")
        );
        assert_eq!(config.reload_interval, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_relative_source_path_resolves_against_config_dir() {
        let temp_file = create_temp_config("[source]\npath = \"callers.json\"\n");

        let config = load_from_file(temp_file.path(), ConfigBuilder::new())
            .unwrap()
            .build()
            .unwrap();

        let expected = temp_file.path().parent().unwrap().join("callers.json");
        assert_eq!(config.source_path, expected);
    }

    #[test]
    fn test_zero_interval_disables_reload() {
        let temp_file = create_temp_config("[source]\npath = \"/a.json\"\n[reload]\ninterval_secs = 0\n");
        let config = load_from_file(temp_file.path(), ConfigBuilder::new())
            .unwrap()
            .build()
            .unwrap();
        assert!(config.reload_interval.is_none());
    }

    #[test]
    fn test_load_from_file_not_found() {
        let result = load_from_file(
            Path::new("/nonexistent/path/config.toml"),
            ConfigBuilder::new(),
        );
        let err = result.unwrap_err();
        assert!(err.is_config());
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_load_from_file_invalid_toml() {
        let temp_file = create_temp_config("this is not valid toml {{{{");

        let err = load_from_file(temp_file.path(), ConfigBuilder::new()).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_load_from_file_wrong_type() {
        let temp_file = create_temp_config("[reload]\ninterval_secs = \"soon\"\n");
        let err = load_from_file(temp_file.path(), ConfigBuilder::new()).unwrap_err();
        assert!(err.is_config());
    }
}
