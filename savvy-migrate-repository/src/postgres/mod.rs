//! PostgreSQL module - connection setup, schema migrations and row inserts.
mod target_store;

pub use target_store::PostgresTargetStore;
