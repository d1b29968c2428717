//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tempfile::TempDir;
use uuid::Uuid;

use daghbas_core::config::AppConfig;
use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_core::traits::{ByteStream, StorageProvider};
use daghbas_database::MemoryStore;
use daghbas_database::store::{
    AuditStore, FileStore, FolderStore, GrantStore, InstallationStore, Store, UnitOfWork,
};
use daghbas_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use daghbas_entity::file::FileRecord;
use daghbas_entity::folder::Folder;
use daghbas_entity::installation::Installation;
use daghbas_entity::permission::{GrantFlags, PermissionGrant};
use daghbas_entity::user::{Principal, UserRole};
use daghbas_service::ServiceContainer;
use daghbas_storage::LocalStorageProvider;

/// Master key configured for every test app.
pub const MASTER_KEY: &str = "test-master-key";

/// Test application context
pub struct TestApp {
    /// Wired services
    pub services: ServiceContainer,
    /// Blob store wrapper used by the services
    pub storage: Arc<FlakyStorage>,
    /// Record store wrapper used by the services
    pub store: Arc<FaultyStore>,
    /// An administrator principal
    pub admin: Principal,
    /// Application config
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestApp {
    /// Create a new test application with grants enforced
    pub async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    /// Create a test application from a tweaked config
    pub async fn with_config(config: AppConfig) -> Self {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let local = LocalStorageProvider::new(dir.path())
            .await
            .expect("Failed to init storage");
        let storage = Arc::new(FlakyStorage::new(local));
        let store = Arc::new(FaultyStore::new(MemoryStore::new()));
        let services = ServiceContainer::new(
            &config,
            Arc::clone(&store) as Arc<dyn Store>,
            Arc::clone(&storage) as Arc<dyn StorageProvider>,
        );

        Self {
            services,
            storage,
            store,
            admin: Principal::new(Uuid::new_v4(), UserRole::Admin),
            config,
            _dir: dir,
        }
    }

    /// A fresh active principal with the given role
    pub fn user(&self, role: UserRole) -> Principal {
        Principal::new(Uuid::new_v4(), role)
    }

    /// Create a root folder as the administrator
    pub async fn root_folder(&self, name: &str) -> Folder {
        self.services
            .folders
            .create_folder(&self.admin, name, None)
            .await
            .expect("Failed to create folder")
    }

    /// Give `user` the flags on `folder_id`
    pub async fn grant(&self, user: &Principal, folder_id: Uuid, flags: GrantFlags) {
        self.services
            .permissions
            .grant(&self.admin, user.user_id, folder_id, flags)
            .await
            .expect("Failed to grant");
    }

    /// Read a file's current payload through the download service
    pub async fn read_payload(&self, file_id: Uuid) -> Bytes {
        let mut download = self
            .services
            .downloads
            .download(&self.admin, file_id)
            .await
            .expect("Failed to download");
        let mut buf = Vec::new();
        while let Some(chunk) = download.stream.next().await {
            buf.extend_from_slice(&chunk.expect("Failed to read chunk"));
        }
        Bytes::from(buf)
    }

    /// Number of audit entries recorded so far
    pub async fn audit_count(&self) -> usize {
        self.services
            .audit
            .recent(&self.admin, 500)
            .await
            .expect("Failed to read audit log")
            .len()
    }
}

/// Config with enforced grants and a known master key
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.access.enforce_grants = true;
    config.access.admin_bypasses_grants = true;
    config.license.master_key = MASTER_KEY.to_string();
    config.license.signing_secret = "test-signing-secret".to_string();
    config.storage.max_upload_size_bytes = 1024 * 1024;
    config
}

/// Local storage whose writes can be switched to fail
#[derive(Debug)]
pub struct FlakyStorage {
    inner: LocalStorageProvider,
    fail_writes: AtomicBool,
}

impl FlakyStorage {
    fn new(inner: LocalStorageProvider) -> Self {
        Self {
            inner,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Make every following write fail
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of payload files under the storage root
    pub fn blob_count(&self) -> usize {
        fn walk(dir: &std::path::Path) -> usize {
            std::fs::read_dir(dir)
                .map(|entries| {
                    entries
                        .filter_map(Result::ok)
                        .map(|e| {
                            let path = e.path();
                            if path.is_dir() { walk(&path) } else { 1 }
                        })
                        .sum()
                })
                .unwrap_or(0)
        }
        walk(self.inner.root())
    }
}

#[async_trait]
impl StorageProvider for FlakyStorage {
    fn provider_type(&self) -> &str {
        "flaky"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.inner.health_check().await
    }

    async fn read(&self, name: &str) -> AppResult<ByteStream> {
        self.inner.read(name).await
    }

    async fn read_bytes(&self, name: &str) -> AppResult<Bytes> {
        self.inner.read_bytes(name).await
    }

    async fn write(&self, name: &str, data: Bytes) -> AppResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(AppError::storage("Disk full"));
        }
        self.inner.write(name, data).await
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        self.inner.delete(name).await
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        self.inner.exists(name).await
    }
}

/// Memory store whose audit appends can be switched to fail
#[derive(Debug)]
pub struct FaultyStore {
    inner: MemoryStore,
    fail_audit: Arc<AtomicBool>,
}

impl FaultyStore {
    fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            fail_audit: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Make every following audit append fail
    pub fn fail_audit(&self, fail: bool) {
        self.fail_audit.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl Store for FaultyStore {
    fn backend(&self) -> &'static str {
        "faulty"
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        Ok(Box::new(FaultyUnit {
            inner: self.inner.begin().await?,
            fail_audit: Arc::clone(&self.fail_audit),
        }))
    }
}

struct FaultyUnit {
    inner: Box<dyn UnitOfWork>,
    fail_audit: Arc<AtomicBool>,
}

#[async_trait]
impl FolderStore for FaultyUnit {
    async fn find_folder(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        self.inner.find_folder(id).await
    }

    async fn find_folder_for_share(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        self.inner.find_folder_for_share(id).await
    }

    async fn find_folder_for_update(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        self.inner.find_folder_for_update(id).await
    }

    async fn list_folders(&mut self) -> AppResult<Vec<Folder>> {
        self.inner.list_folders().await
    }

    async fn list_child_folders(&mut self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        self.inner.list_child_folders(parent_id).await
    }

    async fn insert_folder(&mut self, folder: &Folder) -> AppResult<()> {
        self.inner.insert_folder(folder).await
    }

    async fn delete_folder(&mut self, id: Uuid) -> AppResult<bool> {
        self.inner.delete_folder(id).await
    }
}

#[async_trait]
impl FileStore for FaultyUnit {
    async fn find_file(&mut self, id: Uuid) -> AppResult<Option<FileRecord>> {
        self.inner.find_file(id).await
    }

    async fn lock_file(&mut self, id: Uuid) -> AppResult<Option<FileRecord>> {
        self.inner.lock_file(id).await
    }

    async fn lock_file_name(&mut self, folder_id: Uuid, name: &str) -> AppResult<()> {
        self.inner.lock_file_name(folder_id, name).await
    }

    async fn find_file_by_name(
        &mut self,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<Option<FileRecord>> {
        self.inner.find_file_by_name(folder_id, name).await
    }

    async fn list_files(&mut self, folder_id: Uuid) -> AppResult<Vec<FileRecord>> {
        self.inner.list_files(folder_id).await
    }

    async fn count_files(&mut self, folder_id: Uuid) -> AppResult<i64> {
        self.inner.count_files(folder_id).await
    }

    async fn insert_file(&mut self, file: &FileRecord) -> AppResult<()> {
        self.inner.insert_file(file).await
    }

    async fn update_file(&mut self, file: &FileRecord) -> AppResult<()> {
        self.inner.update_file(file).await
    }

    async fn delete_file(&mut self, id: Uuid) -> AppResult<bool> {
        self.inner.delete_file(id).await
    }
}

#[async_trait]
impl GrantStore for FaultyUnit {
    async fn find_grant(
        &mut self,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<Option<PermissionGrant>> {
        self.inner.find_grant(user_id, folder_id).await
    }

    async fn upsert_grant(&mut self, grant: &PermissionGrant) -> AppResult<PermissionGrant> {
        self.inner.upsert_grant(grant).await
    }

    async fn delete_grant(&mut self, user_id: Uuid, folder_id: Uuid) -> AppResult<bool> {
        self.inner.delete_grant(user_id, folder_id).await
    }

    async fn list_grants_for_folder(
        &mut self,
        folder_id: Uuid,
    ) -> AppResult<Vec<PermissionGrant>> {
        self.inner.list_grants_for_folder(folder_id).await
    }
}

#[async_trait]
impl AuditStore for FaultyUnit {
    async fn append_audit(&mut self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        if self.fail_audit.load(Ordering::SeqCst) {
            return Err(AppError::database("Audit table unavailable"));
        }
        self.inner.append_audit(entry).await
    }

    async fn recent_audit(&mut self, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        self.inner.recent_audit(limit).await
    }

    async fn audit_for_target(
        &mut self,
        target_type: &str,
        target_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        self.inner.audit_for_target(target_type, target_id).await
    }
}

#[async_trait]
impl InstallationStore for FaultyUnit {
    async fn lock_device(&mut self, device_id: &str) -> AppResult<()> {
        self.inner.lock_device(device_id).await
    }

    async fn find_installation(&mut self, device_id: &str) -> AppResult<Option<Installation>> {
        self.inner.find_installation(device_id).await
    }

    async fn upsert_installation(&mut self, installation: &Installation) -> AppResult<()> {
        self.inner.upsert_installation(installation).await
    }
}

#[async_trait]
impl UnitOfWork for FaultyUnit {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.inner.commit().await
    }
}
