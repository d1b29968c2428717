//! PostgreSQL-backed store.
//!
//! A unit of work is one database transaction. Row locks
//! (`SELECT ... FOR UPDATE`) serialize work on an existing file; advisory
//! transaction locks serialize work on a name that may not have a row yet.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::debug;
use uuid::Uuid;

use daghbas_core::error::{AppError, ErrorKind};
use daghbas_core::result::AppResult;
use daghbas_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use daghbas_entity::file::FileRecord;
use daghbas_entity::folder::Folder;
use daghbas_entity::installation::Installation;
use daghbas_entity::permission::PermissionGrant;

use crate::connection::DatabasePool;
use crate::repositories::{
    AuditLogRepository, FileRepository, FolderRepository, GrantRepository, InstallationRepository,
};
use crate::store::{
    AuditStore, FileStore, FolderStore, GrantStore, InstallationStore, Store, UnitOfWork,
};

/// Store backed by a PostgreSQL pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Create a store over an existing pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a store from a connected [`DatabasePool`].
    pub fn from_database(db: &DatabasePool) -> Self {
        Self::new(db.pool().clone())
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;
        Ok(Box::new(PgUnitOfWork { tx }))
    }
}

/// One open PostgreSQL transaction. Dropping it rolls back.
pub struct PgUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

impl std::fmt::Debug for PgUnitOfWork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgUnitOfWork").finish_non_exhaustive()
    }
}

#[async_trait]
impl FolderStore for PgUnitOfWork {
    async fn find_folder(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        FolderRepository::find_by_id(&mut self.tx, id).await
    }

    async fn find_folder_for_share(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        FolderRepository::find_for_share(&mut self.tx, id).await
    }

    async fn find_folder_for_update(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        FolderRepository::find_for_update(&mut self.tx, id).await
    }

    async fn list_folders(&mut self) -> AppResult<Vec<Folder>> {
        FolderRepository::find_all(&mut self.tx).await
    }

    async fn list_child_folders(&mut self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        FolderRepository::find_children(&mut self.tx, parent_id).await
    }

    async fn insert_folder(&mut self, folder: &Folder) -> AppResult<()> {
        FolderRepository::create(&mut self.tx, folder).await
    }

    async fn delete_folder(&mut self, id: Uuid) -> AppResult<bool> {
        FolderRepository::delete(&mut self.tx, id).await
    }
}

#[async_trait]
impl FileStore for PgUnitOfWork {
    async fn find_file(&mut self, id: Uuid) -> AppResult<Option<FileRecord>> {
        FileRepository::find_by_id(&mut self.tx, id).await
    }

    async fn lock_file(&mut self, id: Uuid) -> AppResult<Option<FileRecord>> {
        FileRepository::find_for_update(&mut self.tx, id).await
    }

    async fn lock_file_name(&mut self, folder_id: Uuid, name: &str) -> AppResult<()> {
        FileRepository::lock_name(&mut self.tx, folder_id, name).await
    }

    async fn find_file_by_name(
        &mut self,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<Option<FileRecord>> {
        FileRepository::find_by_folder_and_name(&mut self.tx, folder_id, name).await
    }

    async fn list_files(&mut self, folder_id: Uuid) -> AppResult<Vec<FileRecord>> {
        FileRepository::find_by_folder(&mut self.tx, folder_id).await
    }

    async fn count_files(&mut self, folder_id: Uuid) -> AppResult<i64> {
        FileRepository::count_by_folder(&mut self.tx, folder_id).await
    }

    async fn insert_file(&mut self, file: &FileRecord) -> AppResult<()> {
        FileRepository::create(&mut self.tx, file).await
    }

    async fn update_file(&mut self, file: &FileRecord) -> AppResult<()> {
        FileRepository::update(&mut self.tx, file).await
    }

    async fn delete_file(&mut self, id: Uuid) -> AppResult<bool> {
        FileRepository::delete(&mut self.tx, id).await
    }
}

#[async_trait]
impl GrantStore for PgUnitOfWork {
    async fn find_grant(
        &mut self,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<Option<PermissionGrant>> {
        GrantRepository::find(&mut self.tx, user_id, folder_id).await
    }

    async fn upsert_grant(&mut self, grant: &PermissionGrant) -> AppResult<PermissionGrant> {
        GrantRepository::upsert(&mut self.tx, grant).await
    }

    async fn delete_grant(&mut self, user_id: Uuid, folder_id: Uuid) -> AppResult<bool> {
        GrantRepository::delete(&mut self.tx, user_id, folder_id).await
    }

    async fn list_grants_for_folder(
        &mut self,
        folder_id: Uuid,
    ) -> AppResult<Vec<PermissionGrant>> {
        GrantRepository::find_by_folder(&mut self.tx, folder_id).await
    }
}

#[async_trait]
impl AuditStore for PgUnitOfWork {
    async fn append_audit(&mut self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let entry = entry.into_entry();
        AuditLogRepository::create(&mut self.tx, &entry).await?;
        Ok(entry)
    }

    async fn recent_audit(&mut self, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        AuditLogRepository::find_recent(&mut self.tx, limit).await
    }

    async fn audit_for_target(
        &mut self,
        target_type: &str,
        target_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        AuditLogRepository::find_by_target(&mut self.tx, target_type, target_id).await
    }
}

#[async_trait]
impl InstallationStore for PgUnitOfWork {
    async fn lock_device(&mut self, device_id: &str) -> AppResult<()> {
        InstallationRepository::lock_device(&mut self.tx, device_id).await
    }

    async fn find_installation(&mut self, device_id: &str) -> AppResult<Option<Installation>> {
        InstallationRepository::find_by_device(&mut self.tx, device_id).await
    }

    async fn upsert_installation(&mut self, installation: &Installation) -> AppResult<()> {
        InstallationRepository::upsert(&mut self.tx, installation).await
    }
}

#[async_trait]
impl UnitOfWork for PgUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;
        debug!("Transaction committed");
        Ok(())
    }
}
