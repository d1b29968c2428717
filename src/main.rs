//! Daghbas Share operator CLI.
//!
//! Loads configuration, initializes logging and dispatches to a
//! subcommand that drives the services directly.

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt};

use daghbas_core::config::AppConfig;
use daghbas_core::error::AppError;

mod commands;
mod output;

use commands::Cli;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match load_configuration(cli.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cli.execute(&config).await {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}

/// Load configuration from an explicit path, `DAGHBAS_CONFIG`, or the
/// `config/` directory overlaid with `DAGHBAS_ENV`.
fn load_configuration(path: Option<&str>) -> Result<AppConfig, AppError> {
    let explicit = path
        .map(str::to_string)
        .or_else(|| std::env::var("DAGHBAS_CONFIG").ok());
    match explicit {
        Some(path) => AppConfig::load_file(&path),
        None => {
            let env = std::env::var("DAGHBAS_ENV").unwrap_or_else(|_| "development".to_string());
            AppConfig::load(&env)
        }
    }
}

/// Initialize tracing
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .with_writer(std::io::stderr)
                .init();
        }
    }
}
