//! Error types for the target store.
mod target_store;

pub use target_store::TargetStoreError;
