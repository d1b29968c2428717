//! Folder grant commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use daghbas_core::error::AppError;
use daghbas_entity::permission::{GrantFlags, PermissionGrant};
use daghbas_entity::user::Principal;
use daghbas_service::ServiceContainer;

use crate::output::{self, OutputFormat};

/// Arguments for grant commands
#[derive(Debug, Args)]
pub struct GrantArgs {
    /// Grant subcommand
    #[command(subcommand)]
    pub command: GrantCommand,
}

/// Grant subcommands
#[derive(Debug, Subcommand)]
pub enum GrantCommand {
    /// Set a user's flags on a folder, replacing any existing grant
    Set {
        /// User receiving the grant
        #[arg(short, long)]
        user_id: Uuid,
        /// Folder ID
        #[arg(short = 'F', long)]
        folder_id: Uuid,
        /// Allow reading
        #[arg(long)]
        read: bool,
        /// Allow uploads, saves, locks and moves
        #[arg(long)]
        write: bool,
        /// Allow deletes
        #[arg(long)]
        delete: bool,
    },
    /// Remove a user's grant on a folder
    Revoke {
        /// User ID
        #[arg(short, long)]
        user_id: Uuid,
        /// Folder ID
        #[arg(short = 'F', long)]
        folder_id: Uuid,
    },
    /// List the grants on a folder
    List {
        /// Folder ID
        #[arg(short = 'F', long)]
        folder_id: Uuid,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct GrantRow {
    user_id: String,
    folder_id: String,
    read: bool,
    write: bool,
    delete: bool,
    granted_by: String,
}

impl From<&PermissionGrant> for GrantRow {
    fn from(g: &PermissionGrant) -> Self {
        Self {
            user_id: g.user_id.to_string(),
            folder_id: g.folder_id.to_string(),
            read: g.can_read,
            write: g.can_write,
            delete: g.can_delete,
            granted_by: g.granted_by.to_string(),
        }
    }
}

/// Execute grant commands
pub async fn execute(
    args: &GrantArgs,
    services: &ServiceContainer,
    principal: &Principal,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        GrantCommand::Set {
            user_id,
            folder_id,
            read,
            write,
            delete,
        } => {
            let flags = GrantFlags {
                can_read: *read,
                can_write: *write,
                can_delete: *delete,
            };
            let grant = services
                .permissions
                .grant(principal, *user_id, *folder_id, flags)
                .await?;
            output::print_item(&GrantRow::from(&grant), format);
        }
        GrantCommand::Revoke { user_id, folder_id } => {
            services
                .permissions
                .revoke(principal, *user_id, *folder_id)
                .await?;
            output::print_success(&format!("Grant for {user_id} on {folder_id} revoked"));
        }
        GrantCommand::List { folder_id } => {
            let grants = services
                .permissions
                .list_for_folder(principal, *folder_id)
                .await?;
            let rows: Vec<GrantRow> = grants.iter().map(GrantRow::from).collect();
            output::print_list(&rows, format);
        }
    }
    Ok(())
}
