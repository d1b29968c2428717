//! Folder commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;
use uuid::Uuid;

use daghbas_core::error::AppError;
use daghbas_entity::folder::Folder;
use daghbas_entity::user::Principal;
use daghbas_service::ServiceContainer;

use crate::output::{self, OutputFormat};

/// Arguments for folder commands
#[derive(Debug, Args)]
pub struct FolderArgs {
    /// Folder subcommand
    #[command(subcommand)]
    pub command: FolderCommand,
}

/// Folder subcommands
#[derive(Debug, Subcommand)]
pub enum FolderCommand {
    /// Create a folder
    Create {
        /// Folder name
        #[arg(short, long)]
        name: String,
        /// Parent folder ID (omit for a root folder)
        #[arg(short, long)]
        parent_id: Option<Uuid>,
    },
    /// List folders, or the children of one folder
    List {
        /// Only list children of this folder
        #[arg(short, long)]
        parent_id: Option<Uuid>,
    },
    /// Delete an empty folder
    Delete {
        /// Folder ID
        id: Uuid,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct FolderRow {
    id: String,
    name: String,
    parent: String,
    created: String,
}

impl From<&Folder> for FolderRow {
    fn from(f: &Folder) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.name.clone(),
            parent: f
                .parent_id
                .map(|p| p.to_string())
                .unwrap_or_else(|| "-".to_string()),
            created: super::format_time(Some(f.created_at)),
        }
    }
}

/// Execute folder commands
pub async fn execute(
    args: &FolderArgs,
    services: &ServiceContainer,
    principal: &Principal,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FolderCommand::Create { name, parent_id } => {
            let folder = services
                .folders
                .create_folder(principal, name, *parent_id)
                .await?;
            output::print_item(&FolderRow::from(&folder), format);
        }
        FolderCommand::List { parent_id } => {
            let folders = match parent_id {
                Some(parent) => services.folders.list_children(principal, *parent).await?,
                None => services.folders.list_folders(principal).await?,
            };
            let rows: Vec<FolderRow> = folders.iter().map(FolderRow::from).collect();
            output::print_list(&rows, format);
        }
        FolderCommand::Delete { id } => {
            services.folders.delete_folder(principal, *id).await?;
            output::print_success(&format!("Folder {id} deleted"));
        }
    }
    Ok(())
}
