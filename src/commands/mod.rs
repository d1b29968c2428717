//! CLI command definitions and dispatch.

pub mod audit;
pub mod file;
pub mod folder;
pub mod grant;
pub mod license;
pub mod migrate;

use std::sync::Arc;

use clap::{Parser, Subcommand};
use uuid::Uuid;

use daghbas_core::config::AppConfig;
use daghbas_core::error::AppError;
use daghbas_database::{DatabasePool, PgStore};
use daghbas_entity::user::{Principal, UserRole};
use daghbas_service::ServiceContainer;

use crate::output::OutputFormat;

/// Daghbas Share: shared folders with exclusive edit locks and versioned saves
#[derive(Debug, Parser)]
#[command(name = "daghbas", version, about, long_about = None)]
pub struct Cli {
    /// Path to a configuration file (defaults to config/ plus DAGHBAS_ENV)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table", global = true)]
    pub format: OutputFormat,

    /// Act as this user
    #[arg(long, global = true)]
    pub as_user: Option<Uuid>,

    /// Role of the acting user
    #[arg(long, default_value = "employee", global = true)]
    pub role: UserRole,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Apply database migrations
    Migrate(migrate::MigrateArgs),
    /// Folder management
    Folder(folder::FolderArgs),
    /// File upload, locking and versioning
    File(file::FileArgs),
    /// Folder grants
    Grant(grant::GrantArgs),
    /// Audit trail
    Audit(audit::AuditArgs),
    /// Device licenses
    License(license::LicenseArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self, config: &AppConfig) -> Result<(), AppError> {
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, config).await,
            Commands::Folder(args) => {
                let services = connect(config).await?;
                folder::execute(args, &services, &self.principal()?, self.format).await
            }
            Commands::File(args) => {
                let services = connect(config).await?;
                file::execute(args, &services, &self.principal()?, self.format).await
            }
            Commands::Grant(args) => {
                let services = connect(config).await?;
                grant::execute(args, &services, &self.principal()?, self.format).await
            }
            Commands::Audit(args) => {
                let services = connect(config).await?;
                audit::execute(args, &services, &self.principal()?, self.format).await
            }
            Commands::License(args) => {
                let services = connect(config).await?;
                license::execute(args, &services, self.format).await
            }
        }
    }

    /// The principal named by `--as-user` and `--role`.
    fn principal(&self) -> Result<Principal, AppError> {
        let user_id = self
            .as_user
            .ok_or_else(|| AppError::authentication("--as-user is required for this command"))?;
        Ok(Principal::new(user_id, self.role))
    }
}

/// Connect to PostgreSQL and wire the services.
pub async fn connect(config: &AppConfig) -> Result<ServiceContainer, AppError> {
    let pool = DatabasePool::connect(&config.database).await?;
    let store = Arc::new(PgStore::from_database(&pool));
    ServiceContainer::with_local_storage(config, store).await
}

/// Display form of an optional timestamp.
pub(crate) fn format_time(at: Option<chrono::DateTime<chrono::Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| "-".to_string())
}
