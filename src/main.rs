//! Jewelbox command-line client.
//!
//! Wires configuration, logging, and the session-aware backend client
//! together, then runs one command.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use jewelbox_client::JewelboxClient;
use jewelbox_core::config::{AppConfig, LogFormat, LoggingConfig};
use jewelbox_core::error::{AppError, ErrorKind};

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(&cli.config) {
        Ok(c) => c,
        Err(e) => {
            output::print_error(&format!("Failed to load configuration: {}", e));
            std::process::exit(1);
        }
    };

    init_logging(&config.logging);

    if let Err(e) = run(&cli, &config).await {
        tracing::debug!(kind = %e.kind, error = %e, "Command failed");
        output::print_error(&describe(&e));
        std::process::exit(1);
    }
}

/// Load configuration from file and environment
fn load_configuration(config_path: &str) -> Result<AppConfig, AppError> {
    let env = std::env::var("JEWELBOX_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(config_path, &env)
}

/// Install the global subscriber. Logs go to stderr so command output
/// stays clean; `RUST_LOG` overrides the configured level.
fn init_logging(config: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    match config.format {
        LogFormat::Json => builder.json().init(),
        LogFormat::Pretty => builder.pretty().init(),
    }
}

async fn run(cli: &Cli, config: &AppConfig) -> Result<(), AppError> {
    tracing::debug!(
        base_url = %config.api.base_url,
        storage = %config.session.storage,
        "Starting Jewelbox v{}",
        env!("CARGO_PKG_VERSION")
    );

    let client = JewelboxClient::connect(config).await?;
    cli.execute(&client).await
}

/// User-facing text for a failed command.
fn describe(e: &AppError) -> String {
    let hint = match e.kind {
        ErrorKind::Authentication => Some("please sign in again"),
        ErrorKind::Network => Some("check your connection"),
        _ => None,
    };

    match hint {
        Some(hint) if !e.message.contains(hint) => format!("{} ({})", e.message, hint),
        _ => e.message.clone(),
    }
}
