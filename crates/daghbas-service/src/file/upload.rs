//! Upload and save-in-place: the create-vs-replace half of the engine.

use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};
use uuid::Uuid;

use daghbas_auth::acl::PermissionOracle;
use daghbas_auth::rbac::RbacEnforcer;
use daghbas_core::error::{AppError, ErrorKind};
use daghbas_core::result::AppResult;
use daghbas_core::traits::StorageProvider;
use daghbas_database::store::{Store, UnitOfWork};
use daghbas_entity::audit::{AuditAction, CreateAuditLogEntry};
use daghbas_entity::file::model::extension_of;
use daghbas_entity::file::{CreateFileRecord, FileRecord};
use daghbas_entity::permission::Capability;
use daghbas_entity::user::Principal;

use super::guard::{can_edit, check_payload_size, checksum_sha256, validate_display_name};
use crate::audit::AuditService;

/// Result of an upload by folder and display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    /// The created or replaced file.
    pub file_id: Uuid,
    /// Version after the upload.
    pub version: i32,
    /// Size of the stored payload.
    pub size_bytes: i64,
    /// True when an existing record was replaced.
    pub saved_in_place: bool,
}

/// Result of a save-in-place by file ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    /// The replaced file.
    pub file_id: Uuid,
    /// Version after the save.
    pub version: i32,
    /// Size of the stored payload.
    pub size_bytes: i64,
}

/// How to put the blob store back when a unit of work does not commit.
#[derive(Debug)]
enum BlobUndo {
    /// Remove a blob this operation created.
    Discard(String),
    /// Write back the payload that was overwritten.
    Restore { stored_name: String, previous: Bytes },
}

/// Creates files and replaces their payloads.
#[derive(Debug, Clone)]
pub struct UploadService {
    /// Store handle.
    store: Arc<dyn Store>,
    /// Blob store.
    storage: Arc<dyn StorageProvider>,
    /// Folder permission oracle.
    oracle: Arc<PermissionOracle>,
    /// RBAC enforcer.
    rbac: RbacEnforcer,
    /// Largest accepted payload.
    max_upload_size_bytes: u64,
}

impl UploadService {
    /// Creates a new upload service.
    pub fn new(
        store: Arc<dyn Store>,
        storage: Arc<dyn StorageProvider>,
        oracle: Arc<PermissionOracle>,
        max_upload_size_bytes: u64,
    ) -> Self {
        Self {
            store,
            storage,
            oracle,
            rbac: RbacEnforcer::new(),
            max_upload_size_bytes,
        }
    }

    /// Uploads `payload` as `display_name` into `folder_id`.
    ///
    /// If the folder already holds a file with exactly that name, its bytes
    /// are replaced and its version bumped by one (`saved_in_place = true`).
    /// Otherwise a new record at version 1 is created under a freshly
    /// minted stored-name.
    pub async fn upload(
        &self,
        principal: &Principal,
        folder_id: Uuid,
        display_name: &str,
        payload: Bytes,
    ) -> AppResult<UploadOutcome> {
        self.rbac.require_active(principal)?;
        let name = validate_display_name(display_name)?;
        check_payload_size(payload.len(), self.max_upload_size_bytes)?;

        let mut uow = self.store.begin().await?;
        let mut undo = None;
        let result = match self
            .upload_in(uow.as_mut(), principal, folder_id, name, payload, &mut undo)
            .await
        {
            Ok(outcome) => uow.commit().await.map(|()| outcome),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                info!(
                    user_id = %principal.user_id,
                    folder_id = %folder_id,
                    file_id = %outcome.file_id,
                    version = outcome.version,
                    saved_in_place = outcome.saved_in_place,
                    "File uploaded"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.undo_blob(undo).await;
                Err(e)
            }
        }
    }

    async fn upload_in(
        &self,
        uow: &mut dyn UnitOfWork,
        principal: &Principal,
        folder_id: Uuid,
        name: &str,
        payload: Bytes,
        undo: &mut Option<BlobUndo>,
    ) -> AppResult<UploadOutcome> {
        uow.lock_file_name(folder_id, name).await?;
        uow.find_folder_for_share(folder_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Folder {folder_id} not found")))?;
        self.oracle
            .require(uow, principal, folder_id, Capability::Write)
            .await?;

        if let Some(mut record) = uow.find_file_by_name(folder_id, name).await? {
            can_edit(&record, principal)?;
            self.replace_payload(uow, principal, &mut record, payload, undo)
                .await?;
            return Ok(UploadOutcome {
                file_id: record.id,
                version: record.version,
                size_bytes: record.size_bytes,
                saved_in_place: true,
            });
        }

        let size_bytes = payload.len() as i64;
        let checksum = checksum_sha256(&payload);
        let stored_name = self
            .storage
            .allocate_unique_name(extension_of(name).as_deref());
        *undo = Some(BlobUndo::Discard(stored_name.clone()));
        self.storage.write(&stored_name, payload).await?;

        let record = CreateFileRecord {
            folder_id,
            stored_name,
            original_name: name.to_string(),
            size_bytes,
            checksum_sha256: checksum,
            created_by: principal.user_id,
        }
        .into_record();
        uow.insert_file(&record).await?;
        AuditService::record(
            uow,
            CreateAuditLogEntry::file(principal.user_id, AuditAction::Upload, record.id),
        )
        .await?;

        Ok(UploadOutcome {
            file_id: record.id,
            version: record.version,
            size_bytes: record.size_bytes,
            saved_in_place: false,
        })
    }

    /// Replaces the payload of an existing file addressed by ID.
    pub async fn save_in_place(
        &self,
        principal: &Principal,
        file_id: Uuid,
        payload: Bytes,
    ) -> AppResult<SaveOutcome> {
        self.rbac.require_active(principal)?;
        check_payload_size(payload.len(), self.max_upload_size_bytes)?;

        let mut uow = self.store.begin().await?;
        let mut undo = None;
        let result = match self
            .save_in(uow.as_mut(), principal, file_id, payload, &mut undo)
            .await
        {
            Ok(outcome) => uow.commit().await.map(|()| outcome),
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                info!(
                    user_id = %principal.user_id,
                    file_id = %file_id,
                    version = outcome.version,
                    "File saved in place"
                );
                Ok(outcome)
            }
            Err(e) => {
                self.undo_blob(undo).await;
                Err(e)
            }
        }
    }

    async fn save_in(
        &self,
        uow: &mut dyn UnitOfWork,
        principal: &Principal,
        file_id: Uuid,
        payload: Bytes,
        undo: &mut Option<BlobUndo>,
    ) -> AppResult<SaveOutcome> {
        let mut record = uow
            .lock_file(file_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("File {file_id} not found")))?;
        self.oracle
            .require(uow, principal, record.folder_id, Capability::Write)
            .await?;
        can_edit(&record, principal)?;

        self.replace_payload(uow, principal, &mut record, payload, undo)
            .await?;
        Ok(SaveOutcome {
            file_id,
            version: record.version,
            size_bytes: record.size_bytes,
        })
    }

    /// Overwrites the blob under the record's stored-name, then bumps the
    /// version and appends the audit entry.
    ///
    /// The overwritten payload is kept in `undo` so the caller can put it
    /// back if the unit of work does not commit.
    async fn replace_payload(
        &self,
        uow: &mut dyn UnitOfWork,
        principal: &Principal,
        record: &mut FileRecord,
        payload: Bytes,
        undo: &mut Option<BlobUndo>,
    ) -> AppResult<()> {
        let stored_name = record.stored_name.clone();
        *undo = Some(match self.storage.read_bytes(&stored_name).await {
            Ok(previous) => BlobUndo::Restore {
                stored_name: stored_name.clone(),
                previous,
            },
            Err(e) if e.is(ErrorKind::NotFound) => {
                warn!(file_id = %record.id, stored_name, "Replacing a missing blob");
                BlobUndo::Discard(stored_name.clone())
            }
            Err(e) => return Err(e),
        });

        let size_bytes = payload.len() as i64;
        let checksum = checksum_sha256(&payload);
        self.storage.write(&stored_name, payload).await?;

        record.record_write(size_bytes, checksum, Utc::now());
        uow.update_file(record).await?;
        AuditService::record(
            uow,
            CreateAuditLogEntry::file(principal.user_id, AuditAction::SaveInPlace, record.id),
        )
        .await?;
        Ok(())
    }

    async fn undo_blob(&self, undo: Option<BlobUndo>) {
        match undo {
            None => {}
            Some(BlobUndo::Discard(stored_name)) => {
                if let Err(e) = self.storage.delete(&stored_name).await {
                    warn!(stored_name, error = %e, "Failed to discard orphaned blob");
                }
            }
            Some(BlobUndo::Restore {
                stored_name,
                previous,
            }) => {
                if let Err(e) = self.storage.write(&stored_name, previous).await {
                    error!(stored_name, error = %e, "Failed to restore overwritten blob");
                }
            }
        }
    }
}
