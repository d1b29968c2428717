//! # daghbas-database
//!
//! The explicit store handle injected into every service. A [`Store`]
//! hands out [`UnitOfWork`] scopes; each engine operation runs inside
//! exactly one of them and either commits everything or nothing.
//!
//! Two backends are provided: [`PgStore`] on PostgreSQL and
//! [`MemoryStore`] for single-node deployments and tests.

pub mod connection;
pub mod memory;
pub mod migration;
pub mod postgres;
pub mod repositories;
pub mod store;

pub use connection::DatabasePool;
pub use memory::MemoryStore;
pub use postgres::PgStore;
pub use store::{
    AuditStore, FileStore, FolderStore, GrantStore, InstallationStore, Store, UnitOfWork,
};
