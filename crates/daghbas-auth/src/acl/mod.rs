//! Folder-level permission checks.

pub mod oracle;

pub use oracle::PermissionOracle;
