//! This module defines the `TargetStore` trait, the write-side interface of
//! the migration. It abstracts the relational database so the migration pass
//! can run against PostgreSQL or an in-memory store.
use savvy_migrate_shared::types::NewRow;

use crate::errors::TargetStoreError;

/// A trait that defines the interface for the relational store receiving
/// migrated records.
///
/// Every call is independent: implementors must not wrap several inserts in
/// one transaction, so a failure leaves previously inserted rows in place.
#[async_trait::async_trait]
pub trait TargetStore: Send + Sync {
    /// Brings the relational schema up to date.
    ///
    /// # Returns
    ///
    /// A `Result` indicating success or a `TargetStoreError` if the schema
    /// could not be applied.
    async fn ensure_schema(&self) -> Result<(), TargetStoreError>;

    /// Inserts one row into `table` and returns the relational id the store
    /// generated for it.
    ///
    /// # Arguments
    ///
    /// * `table` - Target table name.
    /// * `row` - Column values, without the id column.
    ///
    /// # Returns
    ///
    /// The freshly generated relational id, or a `TargetStoreError` if the
    /// insert fails.
    async fn insert(&self, table: &str, row: &NewRow) -> Result<String, TargetStoreError>;

    /// Counts the rows currently stored in `table`.
    async fn count(&self, table: &str) -> Result<i64, TargetStoreError>;

    /// Releases the underlying connections. Called exactly once per run,
    /// whether the run succeeded or not.
    async fn close(&self);
}
