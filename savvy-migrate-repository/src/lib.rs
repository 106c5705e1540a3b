//! # Savvy Migrate Repository
//! This crate provides the `TargetStore` abstraction over the relational
//! database receiving migrated records, together with a PostgreSQL
//! implementation and an in-memory implementation used by tests and dry runs.
pub mod errors;
pub mod interfaces;
pub mod memory;
pub mod postgres;

pub use errors::TargetStoreError;
pub use interfaces::TargetStore;
pub use memory::{InMemoryTargetStore, StoredRow};
pub use postgres::PostgresTargetStore;
