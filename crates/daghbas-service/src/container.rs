//! Service wiring.

use std::sync::Arc;

use tracing::info;

use daghbas_auth::acl::PermissionOracle;
use daghbas_core::config::AppConfig;
use daghbas_core::result::AppResult;
use daghbas_core::traits::StorageProvider;
use daghbas_database::store::Store;
use daghbas_storage::LocalStorageProvider;

use crate::audit::AuditService;
use crate::file::{DownloadService, FileService, UploadService};
use crate::folder::FolderService;
use crate::license::LicenseGate;
use crate::permission::PermissionService;

/// Every service, built once from configuration and shared handles.
#[derive(Debug, Clone)]
pub struct ServiceContainer {
    /// Store handle.
    pub store: Arc<dyn Store>,
    /// Blob store.
    pub storage: Arc<dyn StorageProvider>,
    /// Lock, unlock, move, delete and record reads.
    pub files: Arc<FileService>,
    /// Upload and save-in-place.
    pub uploads: Arc<UploadService>,
    /// Payload streaming.
    pub downloads: Arc<DownloadService>,
    /// Folder directory.
    pub folders: Arc<FolderService>,
    /// Grant administration.
    pub permissions: Arc<PermissionService>,
    /// Audit trail.
    pub audit: Arc<AuditService>,
    /// Device license gate.
    pub licenses: Arc<LicenseGate>,
}

impl ServiceContainer {
    /// Wires every service over the given store and blob store.
    pub fn new(
        config: &AppConfig,
        store: Arc<dyn Store>,
        storage: Arc<dyn StorageProvider>,
    ) -> Self {
        let oracle = Arc::new(PermissionOracle::new(config.access.clone()));

        let files = Arc::new(FileService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            Arc::clone(&oracle),
        ));
        let uploads = Arc::new(UploadService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
            Arc::clone(&oracle),
            config.storage.max_upload_size_bytes,
        ));
        let downloads = Arc::new(DownloadService::new(
            Arc::clone(&store),
            Arc::clone(&storage),
        ));
        let folders = Arc::new(FolderService::new(Arc::clone(&store), Arc::clone(&oracle)));
        let permissions = Arc::new(PermissionService::new(Arc::clone(&store)));
        let audit = Arc::new(AuditService::new(Arc::clone(&store)));
        let licenses = Arc::new(LicenseGate::new(Arc::clone(&store), &config.license));

        info!(
            store = store.backend(),
            storage = storage.provider_type(),
            enforce_grants = config.access.enforce_grants,
            "Services initialized"
        );

        Self {
            store,
            storage,
            files,
            uploads,
            downloads,
            folders,
            permissions,
            audit,
            licenses,
        }
    }

    /// Wires every service with a local filesystem blob store rooted at
    /// `storage.root_path`.
    pub async fn with_local_storage(config: &AppConfig, store: Arc<dyn Store>) -> AppResult<Self> {
        let storage = LocalStorageProvider::new(&config.storage.root_path).await?;
        Ok(Self::new(config, store, Arc::new(storage)))
    }
}
