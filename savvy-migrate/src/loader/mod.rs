//! This module defines the `RecordLoader` struct responsible for persisting
//! processed rows to the target store.
//! It acts as the interface between the migration pipeline and the relational
//! database.
use std::sync::Arc;

use savvy_migrate_repository::TargetStore;
use savvy_migrate_shared::types::NewRow;
use tracing::debug;

use crate::errors::LoaderError;

/// `RecordLoader` writes rows through a `TargetStore`.
///
/// Every row is written on its own: nothing is batched or wrapped in a
/// transaction, so rows inserted before a failure stay in place.
pub struct RecordLoader {
    pub target_store: Arc<dyn TargetStore>,
}

impl RecordLoader {
    /// Creates a new `RecordLoader` instance.
    ///
    /// # Arguments
    ///
    /// * `target_store` - An `Arc` trait object implementing `TargetStore`,
    ///   providing the interface for data persistence.
    pub fn new(target_store: Arc<dyn TargetStore>) -> Self {
        Self { target_store }
    }

    /// Applies the relational schema.
    pub async fn prepare(&self) -> Result<(), LoaderError> {
        self.target_store.ensure_schema().await?;
        Ok(())
    }

    /// Inserts one row and returns the relational id the store generated.
    ///
    /// # Arguments
    ///
    /// * `entity` - Entity type of the record, for error reporting
    /// * `table` - Target table
    /// * `index` - Position of the record in its export file
    /// * `row` - Column values to insert
    ///
    /// # Returns
    ///
    /// The new relational id, or a `LoaderError` if the store rejects the row.
    pub async fn load(
        &self,
        entity: &'static str,
        table: &str,
        index: usize,
        row: &NewRow,
    ) -> Result<String, LoaderError> {
        let new_id = self
            .target_store
            .insert(table, row)
            .await
            .map_err(|source| LoaderError::Insert {
                entity,
                index,
                source,
            })?;
        debug!(entity, index, new_id = %new_id, "Inserted row");
        Ok(new_id)
    }

    /// Releases the store's connections.
    pub async fn close(&self) {
        self.target_store.close().await;
    }
}
