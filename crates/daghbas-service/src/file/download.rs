//! File download: opens the payload stream and records the access.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use daghbas_auth::rbac::RbacEnforcer;
use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_core::traits::{ByteStream, StorageProvider};
use daghbas_database::store::Store;
use daghbas_entity::audit::{AuditAction, CreateAuditLogEntry};
use daghbas_entity::file::FileRecord;
use daghbas_entity::user::Principal;

use crate::audit::AuditService;

/// A file record together with its payload stream.
pub struct FileDownload {
    /// File metadata.
    pub record: FileRecord,
    /// Payload bytes.
    pub stream: ByteStream,
}

impl std::fmt::Debug for FileDownload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDownload")
            .field("record", &self.record)
            .finish_non_exhaustive()
    }
}

/// Streams payloads to any authenticated principal.
///
/// No folder grant or lock is consulted: any active principal may
/// download any file.
#[derive(Debug, Clone)]
pub struct DownloadService {
    /// Store handle.
    store: Arc<dyn Store>,
    /// Blob store.
    storage: Arc<dyn StorageProvider>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
}

impl DownloadService {
    /// Creates a new download service.
    pub fn new(store: Arc<dyn Store>, storage: Arc<dyn StorageProvider>) -> Self {
        Self {
            store,
            storage,
            rbac: RbacEnforcer::new(),
        }
    }

    /// Opens a file for download and appends a `download` audit entry.
    pub async fn download(&self, principal: &Principal, file_id: Uuid) -> AppResult<FileDownload> {
        self.rbac.require_active(principal)?;
        let mut uow = self.store.begin().await?;
        let record = uow
            .find_file(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;

        let stream = self.storage.read(&record.stored_name).await?;
        AuditService::record(
            uow.as_mut(),
            CreateAuditLogEntry::file(principal.user_id, AuditAction::Download, file_id),
        )
        .await?;
        uow.commit().await?;

        info!(user_id = %principal.user_id, file_id = %file_id, "File downloaded");
        Ok(FileDownload { record, stream })
    }
}
