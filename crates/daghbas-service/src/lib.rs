//! # daghbas-service
//!
//! Business logic service layer for Daghbas Share. Each service runs its
//! operations inside one unit of work obtained from the injected store,
//! so a mutation, its blob write and its audit entry land together or not
//! at all.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod audit;
pub mod container;
pub mod file;
pub mod folder;
pub mod license;
pub mod permission;

pub use audit::AuditService;
pub use container::ServiceContainer;
pub use file::{
    DownloadService, FileDownload, FileService, SaveOutcome, UploadOutcome, UploadService,
};
pub use folder::FolderService;
pub use license::{ActivationResult, LicenseGate, LicenseVerdict};
pub use permission::PermissionService;
