//! # daghbas-core
//!
//! Core crate for Daghbas Share. Contains the configuration schema, the
//! blob storage trait, and the unified error system.
//!
//! This crate has **no** internal dependencies on other Daghbas crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
