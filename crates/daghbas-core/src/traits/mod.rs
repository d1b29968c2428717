//! Core traits defined in `daghbas-core` and implemented by other crates.

pub mod storage;

pub use storage::{ByteStream, StorageProvider};
