//! # daghbas-auth
//!
//! Authorization and license primitives for Daghbas Share.
//!
//! ## Modules
//!
//! - `acl`: the folder Permission Oracle (flat grant table plus admin override)
//! - `rbac`: role-level checks for administrative operations
//! - `license`: signing and verification of device license tokens

pub mod acl;
pub mod license;
pub mod rbac;

pub use acl::PermissionOracle;
pub use license::{LicenseClaims, LicenseSigner, MasterKey, TokenCheck};
pub use rbac::RbacEnforcer;
