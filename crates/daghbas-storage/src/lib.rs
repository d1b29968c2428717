//! # daghbas-storage
//!
//! Blob store providers for Daghbas Share. Payloads are addressed only by
//! their opaque stored-name.

pub mod providers;

pub use providers::local::LocalStorageProvider;
