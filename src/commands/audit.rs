//! Audit trail commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use daghbas_core::error::AppError;
use daghbas_entity::audit::{AuditLogEntry, TargetType};
use daghbas_entity::user::Principal;
use daghbas_service::ServiceContainer;

use crate::output::{self, OutputFormat};

/// Arguments for audit commands
#[derive(Debug, Args)]
pub struct AuditArgs {
    /// Audit subcommand
    #[command(subcommand)]
    pub command: AuditCommand,
}

/// Audit subcommands
#[derive(Debug, Subcommand)]
pub enum AuditCommand {
    /// Most recent entries, newest first
    Recent {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: i64,
    },
    /// Entries for one file or folder
    Target {
        /// `file` or `folder`
        #[arg(short = 't', long = "type")]
        target_type: TargetType,
        /// Target ID
        id: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct AuditRow {
    at: String,
    actor: String,
    action: String,
    target_type: String,
    target_id: String,
}

impl From<&AuditLogEntry> for AuditRow {
    fn from(e: &AuditLogEntry) -> Self {
        Self {
            at: super::format_time(Some(e.created_at)),
            actor: e.actor_id.to_string(),
            action: e.action.clone(),
            target_type: e.target_type.clone(),
            target_id: e.target_id.clone(),
        }
    }
}

/// Execute audit commands
pub async fn execute(
    args: &AuditArgs,
    services: &ServiceContainer,
    principal: &Principal,
    format: OutputFormat,
) -> Result<(), AppError> {
    let entries = match &args.command {
        AuditCommand::Recent { limit } => services.audit.recent(principal, *limit).await?,
        AuditCommand::Target { target_type, id } => {
            services.audit.for_target(principal, *target_type, id).await?
        }
    };
    let rows: Vec<AuditRow> = entries.iter().map(AuditRow::from).collect();
    output::print_list(&rows, format);
    Ok(())
}
