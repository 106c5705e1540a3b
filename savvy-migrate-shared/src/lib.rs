//! # Savvy Migrate Shared
//! This crate defines the data structures shared by the legacy migration
//! workspace: legacy export records, MongoDB extended-JSON unwrapping, the
//! entity catalog description types and the typed rows handed to a target store.
pub mod errors;
pub mod extended_json;
pub mod types;

pub use errors::ExtendedJsonError;
