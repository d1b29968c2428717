//! PostgreSQL repositories.
//!
//! Every method takes the transaction's connection so that all reads and
//! writes of one unit of work share a single transaction.

pub mod audit;
pub mod file;
pub mod folder;
pub mod installation;
pub mod permission;

pub use audit::AuditLogRepository;
pub use file::FileRepository;
pub use folder::FolderRepository;
pub use installation::InstallationRepository;
pub use permission::GrantRepository;

use daghbas_core::error::{AppError, ErrorKind};

/// Map a sqlx error, turning unique-key violations into `Conflict`.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> AppError {
    let unique_violation = err
        .as_database_error()
        .is_some_and(|db| db.is_unique_violation());
    let kind = if unique_violation {
        ErrorKind::Conflict
    } else {
        ErrorKind::Database
    };
    AppError::with_source(kind, context.to_string(), err)
}
