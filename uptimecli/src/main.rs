use clap::Parser;
use libuptime_storm::{load_endpoints, Monitor, MonitorConfig, RunSummary};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, process::ExitCode, time::Duration};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

const DEFAULT_ENDPOINT_FILE: &str = "sample.yaml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
struct Settings {
    interval_secs: u64,
    request_timeout_secs: u64,
    max_concurrency: usize,
}

impl Default for Settings {
    fn default() -> Self {
        let defaults = MonitorConfig::default();
        Self {
            interval_secs: defaults.interval.as_secs(),
            request_timeout_secs: defaults.request_timeout.as_secs(),
            max_concurrency: defaults.max_concurrency,
        }
    }
}

impl Settings {
    fn monitor_config(&self) -> MonitorConfig {
        MonitorConfig {
            interval: Duration::from_secs(self.interval_secs),
            request_timeout: Duration::from_secs(self.request_timeout_secs.max(1)),
            max_concurrency: self.max_concurrency.max(1),
        }
    }
}

fn config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("uptimer").join("config.toml"))
}

fn parse_settings(content: &str) -> Result<Settings, toml::de::Error> {
    toml::from_str(content)
}

fn load_settings() -> Settings {
    let Some(path) = config_path() else {
        return Settings::default();
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Settings::default(),
        Err(e) => {
            warn!("Failed to read {} ({}), using default settings", path.display(), e);
            return Settings::default();
        }
    };

    parse_settings(&content).unwrap_or_else(|e| {
        warn!("Failed to parse {} ({}), using default settings", path.display(), e);
        Settings::default()
    })
}

fn get_default_config_toml() -> String {
    r#"# uptimer configuration

# Seconds to wait between the end of one check cycle and the start of the next
interval_secs = 15

# Per-request timeout in seconds; a request that exceeds it counts as DOWN
request_timeout_secs = 10

# Maximum number of endpoint checks in flight at once
max_concurrency = 10
"#
    .to_string()
}

#[derive(Parser, Debug)]
#[command(name = "uptimer")]
#[command(about = "Poll HTTP endpoints and report per-domain availability", long_about = None)]
struct Args {
    /// YAML file listing the endpoints to check
    #[arg(default_value = DEFAULT_ENDPOINT_FILE)]
    config: PathBuf,

    /// Print the default settings to stdout and exit
    #[arg(long)]
    print_default_config: bool,

    /// Write the default settings to the settings path and exit
    #[arg(long)]
    write_default_config: bool,
}

fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
        _ = terminate => info!("Received SIGTERM, shutting down..."),
    }
}

async fn run(endpoint_file: PathBuf, settings: Settings) -> Result<RunSummary, Box<dyn std::error::Error>> {
    let endpoints = load_endpoints(&endpoint_file)?;
    info!("Loaded {} endpoints from {}", endpoints.len(), endpoint_file.display());

    let monitor = Monitor::with_config(endpoints, settings.monitor_config())?;
    Ok(monitor.run(shutdown_signal()).await)
}

fn main() -> ExitCode {
    let args = Args::parse();

    if args.print_default_config {
        println!("{}", get_default_config_toml());
        return ExitCode::SUCCESS;
    }

    if args.write_default_config {
        let Some(path) = config_path() else {
            eprintln!("Error: Could not determine config path");
            return ExitCode::FAILURE;
        };
        let written = path
            .parent()
            .map_or(Ok(()), std::fs::create_dir_all)
            .and_then(|_| std::fs::write(&path, get_default_config_toml()));
        return match written {
            Ok(()) => {
                println!("Default config written to: {}", path.display());
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: Failed to write {}: {}", path.display(), e);
                ExitCode::FAILURE
            }
        };
    }

    init_logging();
    let settings = load_settings();

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            error!("Failed to start async runtime: {}", e);
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(args.config, settings)) {
        Ok(summary) => {
            info!("Stopped after {} cycles", summary.cycles);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
