//! Database migration commands.

use clap::{Args, Subcommand};

use daghbas_core::config::AppConfig;
use daghbas_core::error::AppError;
use daghbas_database::DatabasePool;
use daghbas_database::migration::{embedded_migrations, run_migrations};

use crate::output;

/// Arguments for the migrate command
#[derive(Debug, Args)]
pub struct MigrateArgs {
    /// Migration subcommand
    #[command(subcommand)]
    pub command: MigrateCommand,
}

/// Migration subcommands
#[derive(Debug, Subcommand)]
pub enum MigrateCommand {
    /// Apply all pending migrations
    Run,
    /// List the migrations compiled into this binary
    List,
}

/// Execute migration commands
pub async fn execute(args: &MigrateArgs, config: &AppConfig) -> Result<(), AppError> {
    match &args.command {
        MigrateCommand::Run => {
            let pool = DatabasePool::connect(&config.database).await?;
            run_migrations(pool.pool()).await?;
            pool.close().await;
            output::print_success("Migrations applied");
        }
        MigrateCommand::List => {
            for (version, description) in embedded_migrations() {
                output::print_kv(&version.to_string(), &description);
            }
        }
    }
    Ok(())
}
