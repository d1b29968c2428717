//! Folder grant entities.

pub mod model;

pub use model::{Capability, GrantFlags, PermissionGrant};
