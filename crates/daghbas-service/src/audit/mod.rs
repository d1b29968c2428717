//! The Audit Recorder.

pub mod service;

pub use service::AuditService;
