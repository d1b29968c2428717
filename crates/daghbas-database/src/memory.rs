//! In-process store for single-node deployments and tests.
//!
//! One async mutex guards the whole state. A unit of work holds the guard
//! for its entire lifetime and edits a private copy of the tables, which
//! replaces the shared tables only on commit. The audit trail is append-only
//! and never copied: a unit buffers its entries and the log is extended on
//! commit. Units are therefore fully serialized, and a dropped unit leaves
//! no trace.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use daghbas_core::error::AppError;
use daghbas_core::result::AppResult;
use daghbas_entity::audit::{AuditLogEntry, CreateAuditLogEntry};
use daghbas_entity::file::FileRecord;
use daghbas_entity::folder::Folder;
use daghbas_entity::installation::Installation;
use daghbas_entity::permission::PermissionGrant;

use crate::store::{
    AuditStore, FileStore, FolderStore, GrantStore, InstallationStore, Store, UnitOfWork,
};

#[derive(Debug, Clone, Default)]
struct Tables {
    folders: HashMap<Uuid, Folder>,
    files: HashMap<Uuid, FileRecord>,
    grants: HashMap<(Uuid, Uuid), PermissionGrant>,
    installations: HashMap<String, Installation>,
}

#[derive(Debug, Default)]
struct MemoryState {
    tables: Tables,
    audit: Vec<AuditLogEntry>,
}

/// Store keeping every table in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn begin(&self) -> AppResult<Box<dyn UnitOfWork>> {
        let guard = Arc::clone(&self.state).lock_owned().await;
        let working = guard.tables.clone();
        Ok(Box::new(MemoryUnitOfWork {
            guard,
            working,
            pending_audit: Vec::new(),
        }))
    }
}

/// An open unit of work on a [`MemoryStore`].
#[derive(Debug)]
pub struct MemoryUnitOfWork {
    guard: OwnedMutexGuard<MemoryState>,
    working: Tables,
    pending_audit: Vec<AuditLogEntry>,
}

impl MemoryUnitOfWork {
    /// Committed entries followed by this unit's own, newest first.
    fn audit_newest_first(&self) -> impl Iterator<Item = &AuditLogEntry> {
        self.pending_audit
            .iter()
            .rev()
            .chain(self.guard.audit.iter().rev())
    }
}

fn sorted_by<T, K: Ord>(mut rows: Vec<T>, key: impl Fn(&T) -> K) -> Vec<T> {
    rows.sort_by_key(|row| key(row));
    rows
}

#[async_trait]
impl FolderStore for MemoryUnitOfWork {
    async fn find_folder(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        Ok(self.working.folders.get(&id).cloned())
    }

    async fn find_folder_for_share(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        self.find_folder(id).await
    }

    async fn find_folder_for_update(&mut self, id: Uuid) -> AppResult<Option<Folder>> {
        self.find_folder(id).await
    }

    async fn list_folders(&mut self) -> AppResult<Vec<Folder>> {
        let rows = self.working.folders.values().cloned().collect();
        Ok(sorted_by(rows, |f: &Folder| (f.name.clone(), f.id)))
    }

    async fn list_child_folders(&mut self, parent_id: Uuid) -> AppResult<Vec<Folder>> {
        let rows = self
            .working
            .folders
            .values()
            .filter(|f| f.parent_id == Some(parent_id))
            .cloned()
            .collect();
        Ok(sorted_by(rows, |f: &Folder| (f.name.clone(), f.id)))
    }

    async fn insert_folder(&mut self, folder: &Folder) -> AppResult<()> {
        if let Some(parent_id) = folder.parent_id {
            if !self.working.folders.contains_key(&parent_id) {
                return Err(AppError::not_found(format!(
                    "Parent folder {parent_id} not found"
                )));
            }
        }
        if self.working.folders.contains_key(&folder.id) {
            return Err(AppError::conflict(format!(
                "Folder {} already exists",
                folder.id
            )));
        }
        self.working.folders.insert(folder.id, folder.clone());
        Ok(())
    }

    async fn delete_folder(&mut self, id: Uuid) -> AppResult<bool> {
        if self.working.folders.remove(&id).is_none() {
            return Ok(false);
        }
        self.working.grants.retain(|&(_, folder_id), _| folder_id != id);
        Ok(true)
    }
}

#[async_trait]
impl FileStore for MemoryUnitOfWork {
    async fn find_file(&mut self, id: Uuid) -> AppResult<Option<FileRecord>> {
        Ok(self.working.files.get(&id).cloned())
    }

    async fn lock_file(&mut self, id: Uuid) -> AppResult<Option<FileRecord>> {
        self.find_file(id).await
    }

    async fn lock_file_name(&mut self, _folder_id: Uuid, _name: &str) -> AppResult<()> {
        // The store-wide guard already serializes every unit.
        Ok(())
    }

    async fn find_file_by_name(
        &mut self,
        folder_id: Uuid,
        name: &str,
    ) -> AppResult<Option<FileRecord>> {
        Ok(self
            .working
            .files
            .values()
            .find(|f| f.folder_id == folder_id && f.original_name == name)
            .cloned())
    }

    async fn list_files(&mut self, folder_id: Uuid) -> AppResult<Vec<FileRecord>> {
        let rows = self
            .working
            .files
            .values()
            .filter(|f| f.folder_id == folder_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |f: &FileRecord| f.original_name.clone()))
    }

    async fn count_files(&mut self, folder_id: Uuid) -> AppResult<i64> {
        let count = self
            .working
            .files
            .values()
            .filter(|f| f.folder_id == folder_id)
            .count();
        Ok(count as i64)
    }

    async fn insert_file(&mut self, file: &FileRecord) -> AppResult<()> {
        if !self.working.folders.contains_key(&file.folder_id) {
            return Err(AppError::not_found(format!(
                "Folder {} not found",
                file.folder_id
            )));
        }
        let clash = self.working.files.values().any(|f| {
            f.id == file.id
                || f.stored_name == file.stored_name
                || (f.folder_id == file.folder_id && f.original_name == file.original_name)
        });
        if clash {
            return Err(AppError::conflict(format!(
                "File '{}' already exists",
                file.original_name
            )));
        }
        self.working.files.insert(file.id, file.clone());
        Ok(())
    }

    async fn update_file(&mut self, file: &FileRecord) -> AppResult<()> {
        let name_taken = self.working.files.values().any(|f| {
            f.id != file.id && f.folder_id == file.folder_id && f.original_name == file.original_name
        });
        if name_taken {
            return Err(AppError::conflict(format!(
                "File '{}' already exists in the target folder",
                file.original_name
            )));
        }
        match self.working.files.get_mut(&file.id) {
            Some(existing) => {
                *existing = file.clone();
                Ok(())
            }
            None => Err(AppError::not_found(format!("File {} not found", file.id))),
        }
    }

    async fn delete_file(&mut self, id: Uuid) -> AppResult<bool> {
        Ok(self.working.files.remove(&id).is_some())
    }
}

#[async_trait]
impl GrantStore for MemoryUnitOfWork {
    async fn find_grant(
        &mut self,
        user_id: Uuid,
        folder_id: Uuid,
    ) -> AppResult<Option<PermissionGrant>> {
        Ok(self.working.grants.get(&(user_id, folder_id)).cloned())
    }

    async fn upsert_grant(&mut self, grant: &PermissionGrant) -> AppResult<PermissionGrant> {
        let key = (grant.user_id, grant.folder_id);
        let stored = match self.working.grants.get(&key) {
            Some(existing) => PermissionGrant {
                id: existing.id,
                ..grant.clone()
            },
            None => grant.clone(),
        };
        self.working.grants.insert(key, stored.clone());
        Ok(stored)
    }

    async fn delete_grant(&mut self, user_id: Uuid, folder_id: Uuid) -> AppResult<bool> {
        Ok(self.working.grants.remove(&(user_id, folder_id)).is_some())
    }

    async fn list_grants_for_folder(
        &mut self,
        folder_id: Uuid,
    ) -> AppResult<Vec<PermissionGrant>> {
        let rows = self
            .working
            .grants
            .values()
            .filter(|g| g.folder_id == folder_id)
            .cloned()
            .collect();
        Ok(sorted_by(rows, |g: &PermissionGrant| g.updated_at))
    }
}

#[async_trait]
impl AuditStore for MemoryUnitOfWork {
    async fn append_audit(&mut self, entry: CreateAuditLogEntry) -> AppResult<AuditLogEntry> {
        let entry = entry.into_entry();
        self.pending_audit.push(entry.clone());
        Ok(entry)
    }

    async fn recent_audit(&mut self, limit: i64) -> AppResult<Vec<AuditLogEntry>> {
        let limit = usize::try_from(limit.max(0)).unwrap_or(usize::MAX);
        Ok(self.audit_newest_first().take(limit).cloned().collect())
    }

    async fn audit_for_target(
        &mut self,
        target_type: &str,
        target_id: &str,
    ) -> AppResult<Vec<AuditLogEntry>> {
        Ok(self
            .audit_newest_first()
            .filter(|e| e.target_type == target_type && e.target_id == target_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl InstallationStore for MemoryUnitOfWork {
    async fn lock_device(&mut self, _device_id: &str) -> AppResult<()> {
        Ok(())
    }

    async fn find_installation(&mut self, device_id: &str) -> AppResult<Option<Installation>> {
        Ok(self.working.installations.get(device_id).cloned())
    }

    async fn upsert_installation(&mut self, installation: &Installation) -> AppResult<()> {
        self.working
            .installations
            .insert(installation.device_id.clone(), installation.clone());
        Ok(())
    }
}

#[async_trait]
impl UnitOfWork for MemoryUnitOfWork {
    async fn commit(self: Box<Self>) -> AppResult<()> {
        let MemoryUnitOfWork {
            mut guard,
            working,
            pending_audit,
        } = *self;
        guard.tables = working;
        guard.audit.extend(pending_audit);
        Ok(())
    }
}
