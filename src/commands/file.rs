//! File commands: upload, save-in-place, download, locking.

use std::path::{Path, PathBuf};

use bytes::Bytes;
use clap::{Args, Subcommand};
use futures::StreamExt;
use serde::Serialize;
use tabled::Tabled;
use tokio::io::AsyncWriteExt;
use uuid::Uuid;

use daghbas_core::error::AppError;
use daghbas_entity::file::FileRecord;
use daghbas_entity::user::Principal;
use daghbas_service::ServiceContainer;

use crate::output::{self, OutputFormat};

/// Arguments for file commands
#[derive(Debug, Args)]
pub struct FileArgs {
    /// File subcommand
    #[command(subcommand)]
    pub command: FileCommand,
}

/// File subcommands
#[derive(Debug, Subcommand)]
pub enum FileCommand {
    /// Upload a local file; replaces the file of the same name in place
    Upload {
        /// Target folder ID
        #[arg(short = 'F', long)]
        folder_id: Uuid,
        /// Local file to upload
        path: PathBuf,
        /// Display name (defaults to the local file name)
        #[arg(short, long)]
        name: Option<String>,
    },
    /// Replace the bytes of an existing file
    Save {
        /// File ID
        id: Uuid,
        /// Local file with the new content
        path: PathBuf,
    },
    /// Download a file's current bytes
    Download {
        /// File ID
        id: Uuid,
        /// Output path (defaults to the display name)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show one file record
    Show {
        /// File ID
        id: Uuid,
    },
    /// List the files in a folder
    List {
        /// Folder ID
        #[arg(short = 'F', long)]
        folder_id: Uuid,
    },
    /// Take the edit lock
    Lock {
        /// File ID
        id: Uuid,
    },
    /// Release the edit lock
    Unlock {
        /// File ID
        id: Uuid,
    },
    /// Move a file to another folder
    Move {
        /// File ID
        id: Uuid,
        /// Target folder ID
        #[arg(short, long)]
        to: Uuid,
    },
    /// Delete a file and its payload
    Delete {
        /// File ID
        id: Uuid,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct FileRow {
    id: String,
    name: String,
    version: i32,
    size: i64,
    locked_by: String,
    locked_at: String,
    updated: String,
}

impl From<&FileRecord> for FileRow {
    fn from(f: &FileRecord) -> Self {
        Self {
            id: f.id.to_string(),
            name: f.original_name.clone(),
            version: f.version,
            size: f.size_bytes,
            locked_by: f
                .locked_by
                .map(|u| u.to_string())
                .unwrap_or_else(|| "-".to_string()),
            locked_at: super::format_time(f.locked_at),
            updated: super::format_time(Some(f.updated_at)),
        }
    }
}

/// Execute file commands
pub async fn execute(
    args: &FileArgs,
    services: &ServiceContainer,
    principal: &Principal,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        FileCommand::Upload {
            folder_id,
            path,
            name,
        } => {
            let display_name = match name {
                Some(name) => name.clone(),
                None => local_file_name(path)?,
            };
            let payload = read_local(path).await?;
            let outcome = services
                .uploads
                .upload(principal, *folder_id, &display_name, payload)
                .await?;
            match format {
                OutputFormat::Json => output::print_json(&outcome),
                OutputFormat::Table => {
                    let verb = if outcome.saved_in_place {
                        "Saved in place"
                    } else {
                        "Uploaded"
                    };
                    output::print_success(&format!("{verb}: {display_name}"));
                    output::print_kv("File ID", &outcome.file_id.to_string());
                    output::print_kv("Version", &outcome.version.to_string());
                    output::print_kv("Size", &outcome.size_bytes.to_string());
                }
            }
        }
        FileCommand::Save { id, path } => {
            let payload = read_local(path).await?;
            let outcome = services.uploads.save_in_place(principal, *id, payload).await?;
            output::print_success(&format!(
                "Saved {} as version {}",
                outcome.file_id, outcome.version
            ));
        }
        FileCommand::Download { id, output: target } => {
            let mut download = services.downloads.download(principal, *id).await?;
            let target = target
                .clone()
                .unwrap_or_else(|| PathBuf::from(&download.record.original_name));
            let mut file = tokio::fs::File::create(&target).await?;
            let mut written: u64 = 0;
            while let Some(chunk) = download.stream.next().await {
                let chunk = chunk?;
                file.write_all(&chunk).await?;
                written += chunk.len() as u64;
            }
            file.flush().await?;
            output::print_success(&format!(
                "Downloaded {} (v{}, {written} bytes) to {}",
                download.record.original_name,
                download.record.version,
                target.display()
            ));
        }
        FileCommand::Show { id } => {
            let record = services.files.get_file(principal, *id).await?;
            output::print_item(&FileRow::from(&record), format);
        }
        FileCommand::List { folder_id } => {
            let files = services.files.list_files(principal, *folder_id).await?;
            let rows: Vec<FileRow> = files.iter().map(FileRow::from).collect();
            output::print_list(&rows, format);
        }
        FileCommand::Lock { id } => {
            let record = services.files.lock(principal, *id).await?;
            output::print_item(&FileRow::from(&record), format);
        }
        FileCommand::Unlock { id } => {
            let record = services.files.unlock(principal, *id).await?;
            output::print_item(&FileRow::from(&record), format);
        }
        FileCommand::Move { id, to } => {
            let record = services.files.move_file(principal, *id, *to).await?;
            output::print_item(&FileRow::from(&record), format);
        }
        FileCommand::Delete { id } => {
            services.files.delete(principal, *id).await?;
            output::print_success(&format!("File {id} deleted"));
        }
    }
    Ok(())
}

async fn read_local(path: &Path) -> Result<Bytes, AppError> {
    let data = tokio::fs::read(path).await?;
    Ok(Bytes::from(data))
}

fn local_file_name(path: &Path) -> Result<String, AppError> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            AppError::validation(format!("Cannot derive a file name from {}", path.display()))
        })
}
