//! The Versioning & Lock Engine.
//!
//! - [`UploadService`]: upload by (folder, display name) and save-in-place by id
//! - [`FileService`]: lock, unlock, move, delete and read access to records
//! - [`DownloadService`]: payload streaming

pub mod download;
pub mod guard;
pub mod service;
pub mod upload;

pub use download::{DownloadService, FileDownload};
pub use guard::can_edit;
pub use service::FileService;
pub use upload::{SaveOutcome, UploadOutcome, UploadService};
