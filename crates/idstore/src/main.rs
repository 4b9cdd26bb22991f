use std::collections::BTreeMap;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use idstore::config::{self, ConfigBuilder};
use idstore::credential::hasher;
use idstore::observability::init_observability;
use idstore::{IdentityCache, JsonFileSource, ReloadTask, Snapshot, USERNAME_PASSWORD};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

#[derive(Parser, Debug)]
#[command(name = "idstore")]
#[command(about = "Cached identity store with credential validation", long_about = None)]
#[command(version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Enable JSON logging output
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load an identity file and print a summary
    Inspect {
        /// JSON identity file (defaults to the configured source)
        file: Option<PathBuf>,
    },

    /// Validate a credential against an identity file
    Validate {
        /// JSON identity file (defaults to the configured source)
        file: Option<PathBuf>,

        /// Caller name
        #[arg(long)]
        caller: String,

        /// Credential type
        #[arg(long = "type", default_value = USERNAME_PASSWORD)]
        kind: String,

        /// Credential value
        #[arg(long, env = "IDSTORE_CREDENTIAL", hide_env_values = true)]
        value: String,

        /// Treat the value as binary; it is compared in base64 form
        #[arg(long)]
        bytes: bool,
    },

    /// Print the stored representation of a credential
    Hash {
        /// Credential value
        #[arg(long, env = "IDSTORE_CREDENTIAL", hide_env_values = true)]
        value: String,

        /// Salt appended before hashing
        #[arg(long)]
        salt: Option<String>,

        /// Digest algorithm (MD5, SHA-1, SHA-224, SHA-256, SHA-384, SHA-512,
        /// SHA-512/224, SHA-512/256)
        #[arg(long, default_value = "SHA-256")]
        algorithm: String,
    },

    /// Load an identity file and reload it periodically until interrupted
    Watch {
        /// JSON identity file (defaults to the configured source)
        file: Option<PathBuf>,

        /// Reload interval in seconds
        #[arg(long)]
        interval: Option<u64>,
    },
}

impl Command {
    fn file(&self) -> Option<&PathBuf> {
        match self {
            Self::Inspect { file } | Self::Validate { file, .. } | Self::Watch { file, .. } => {
                file.as_ref()
            }
            Self::Hash { .. } => None,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Load configuration with precedence: env > file > defaults, then CLI flags
    let mut builder = if let Some(ref path) = cli.config {
        config::load_config_from_path(path)?
    } else {
        config::load_config()?
    };

    if let Some(file) = cli.command.file() {
        builder = builder.source_path(file.clone());
    }

    if cli.verbose {
        builder = builder.log_level("debug".to_string());
    }

    if cli.json_logs {
        builder = builder.json_logs(true);
    }

    init_observability(&builder.telemetry())?;

    run(cli.command, builder).await
}

async fn run(command: Command, builder: ConfigBuilder) -> anyhow::Result<ExitCode> {
    match command {
        Command::Hash {
            value,
            salt,
            algorithm,
        } => {
            let prepared = hasher::prepare(&value, salt.as_deref(), Some(&algorithm))?;
            println!("{prepared}");
            Ok(ExitCode::SUCCESS)
        }

        Command::Inspect { .. } => {
            let config = builder.build()?;
            let cache = IdentityCache::new();
            let report = cache
                .load(JsonFileSource::new(&config.source_path))
                .with_context(|| format!("Failed to load {}", config.source_path.display()))?;

            let snapshot = cache.snapshot()?;
            let summary = Summary::new(&snapshot, report);
            println!("{}", serde_json::to_string_pretty(&summary)?);
            Ok(ExitCode::SUCCESS)
        }

        Command::Validate {
            caller,
            kind,
            value,
            bytes,
            ..
        } => {
            let config = builder.build()?;
            let cache = IdentityCache::new();
            cache
                .load(JsonFileSource::new(&config.source_path))
                .with_context(|| format!("Failed to load {}", config.source_path.display()))?;

            let result = if bytes {
                cache.validate_bytes(Some(&caller), &kind, value.as_bytes())?
            } else {
                cache.validate(Some(&caller), &kind, &value)?
            };

            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(if result.is_valid() {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }

        Command::Watch { interval, .. } => {
            let mut builder = builder;
            if let Some(secs) = interval {
                builder = builder.reload_interval(Duration::from_secs(secs));
            }
            let config = builder.build()?;

            let interval = config
                .reload_interval()
                .context("Reload interval must be greater than zero")?;

            let cache = Arc::new(IdentityCache::new());
            cache
                .load(JsonFileSource::new(&config.source_path))
                .with_context(|| format!("Failed to load {}", config.source_path.display()))?;

            tracing::info!(
                source = %config.source_path.display(),
                interval_secs = interval.as_secs(),
                "Watching identity file"
            );

            let shutdown = CancellationToken::new();
            let task = ReloadTask::new(Arc::clone(&cache), interval).spawn(shutdown.clone());

            tokio::signal::ctrl_c()
                .await
                .context("Failed to install Ctrl+C handler")?;
            tracing::info!("Shutdown signal received");

            shutdown.cancel();
            task.await?;

            let stats = cache.stats();
            tracing::info!(
                loads = stats.loads,
                failed_loads = stats.failed_loads,
                generation = stats.generation,
                "Watch stopped"
            );
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// JSON summary printed by `inspect`
#[derive(Serialize)]
struct Summary<'a> {
    report: idstore::LoadReport,
    callers: Vec<CallerSummary<'a>>,
    groups: BTreeMap<&'a str, &'a [String]>,
    roles: BTreeMap<&'a str, &'a [String]>,
}

#[derive(Serialize)]
struct CallerSummary<'a> {
    name: &'a str,
    groups: Option<&'a [String]>,
    roles: Option<&'a [String]>,
    credential_types: Vec<&'a str>,
}

impl<'a> Summary<'a> {
    fn new(snapshot: &'a Snapshot, report: idstore::LoadReport) -> Self {
        let callers = snapshot
            .caller_names()
            .map(|name| CallerSummary {
                name,
                groups: snapshot.caller_groups(name),
                roles: snapshot.caller_roles(name),
                credential_types: snapshot
                    .caller_credentials(name)
                    .unwrap_or_default()
                    .iter()
                    .map(|c| c.kind.as_str())
                    .collect(),
            })
            .collect();

        let groups = snapshot
            .groups()
            .iter()
            .map(|g| (g.as_str(), snapshot.callers_in_group(g)))
            .collect();

        let roles = snapshot
            .roles()
            .iter()
            .map(|r| (r.as_str(), snapshot.callers_with_role(r)))
            .collect();

        Self {
            report,
            callers,
            groups,
            roles,
        }
    }
}
