//! # daghbas-entity
//!
//! Domain entity models for Daghbas Share. Every struct in this crate
//! represents a database table row or a domain value object. Database
//! entities derive `sqlx::FromRow`.

pub mod audit;
pub mod file;
pub mod folder;
pub mod installation;
pub mod permission;
pub mod user;
