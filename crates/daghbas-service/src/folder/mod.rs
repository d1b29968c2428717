//! The Folder Directory.

pub mod service;

pub use service::FolderService;
