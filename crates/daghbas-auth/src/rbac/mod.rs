//! Role-based checks for administrative operations.

pub mod enforcer;

pub use enforcer::RbacEnforcer;
