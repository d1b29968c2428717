//! Device installation entities.

pub mod model;

pub use model::Installation;
