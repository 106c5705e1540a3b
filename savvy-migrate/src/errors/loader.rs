//! Error types for the loader module.
//! Defines the errors that can occur while persisting rows to the target store.
use savvy_migrate_repository::TargetStoreError;
use thiserror::Error;

/// Represents errors that can occur within the record loader.
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("Target store error: {0}")]
    TargetStore(#[from] TargetStoreError),
    #[error("Failed to insert {entity} record #{index}: {source}")]
    Insert {
        entity: &'static str,
        index: usize,
        #[source]
        source: TargetStoreError,
    },
}
