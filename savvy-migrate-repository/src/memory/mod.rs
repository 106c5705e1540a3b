//! In-memory target store for tests and dry runs.
//!
//! Rows are kept per table in insertion order and receive UUID v4 ids, the
//! same shape the PostgreSQL schema generates. A table can be configured to
//! reject inserts, which lets callers exercise the fatal-error path.
//!
//! # Example
//!
//! ```ignore
//! use savvy_migrate_repository::{InMemoryTargetStore, TargetStore};
//!
//! let store = InMemoryTargetStore::new();
//! let id = store.insert("users", &row).await?;
//! assert_eq!(store.rows("users")[0].id, id);
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use savvy_migrate_shared::types::NewRow;
use uuid::Uuid;

use crate::{TargetStore, TargetStoreError};

/// A row held by the in-memory store.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredRow {
    pub id: String,
    pub row: NewRow,
}

/// Target store keeping every table in memory.
pub struct InMemoryTargetStore {
    tables: RwLock<HashMap<String, Vec<StoredRow>>>,
    failing_tables: HashSet<String>,
    closed: AtomicBool,
}

impl InMemoryTargetStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(HashMap::new()),
            failing_tables: HashSet::new(),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a store whose inserts into `table` always fail.
    pub fn failing_on(table: &str) -> Self {
        let mut store = Self::new();
        store.failing_tables.insert(table.to_string());
        store
    }

    /// Snapshot of the rows inserted into `table`, in insertion order.
    pub fn rows(&self, table: &str) -> Vec<StoredRow> {
        self.tables
            .read()
            .unwrap()
            .get(table)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether `close` has been called.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl Default for InMemoryTargetStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TargetStore for InMemoryTargetStore {
    async fn ensure_schema(&self) -> Result<(), TargetStoreError> {
        Ok(())
    }

    async fn insert(&self, table: &str, row: &NewRow) -> Result<String, TargetStoreError> {
        if self.failing_tables.contains(table) {
            return Err(TargetStoreError::Rejected {
                table: table.to_string(),
                reason: "table configured to fail".to_string(),
            });
        }

        let id = Uuid::new_v4().to_string();
        self.tables
            .write()
            .unwrap()
            .entry(table.to_string())
            .or_default()
            .push(StoredRow {
                id: id.clone(),
                row: row.clone(),
            });
        Ok(id)
    }

    async fn count(&self, table: &str) -> Result<i64, TargetStoreError> {
        Ok(self
            .tables
            .read()
            .unwrap()
            .get(table)
            .map_or(0, |rows| rows.len() as i64))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savvy_migrate_shared::types::ColumnValue;

    fn user_row(email: &str) -> NewRow {
        let mut row = NewRow::new();
        row.push("email", ColumnValue::Text(Some(email.to_string())));
        row
    }

    #[tokio::test]
    async fn test_insert_generates_distinct_ids() {
        let store = InMemoryTargetStore::new();
        let first = store.insert("users", &user_row("a@b.com")).await.unwrap();
        let second = store.insert("users", &user_row("c@d.com")).await.unwrap();

        assert_ne!(first, second);
        assert_eq!(store.count("users").await.unwrap(), 2);

        let rows = store.rows("users");
        assert_eq!(rows[0].id, first);
        assert_eq!(rows[1].row, user_row("c@d.com"));
    }

    #[tokio::test]
    async fn test_unknown_table_counts_zero() {
        let store = InMemoryTargetStore::new();
        assert_eq!(store.count("genres").await.unwrap(), 0);
        assert!(store.rows("genres").is_empty());
    }

    #[tokio::test]
    async fn test_failing_table_rejects_inserts() {
        let store = InMemoryTargetStore::failing_on("links");
        store.insert("users", &user_row("a@b.com")).await.unwrap();

        let err = store.insert("links", &NewRow::new()).await.unwrap_err();
        assert!(matches!(err, TargetStoreError::Rejected { table, .. } if table == "links"));
        assert_eq!(store.count("links").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_close_is_observable() {
        let store = InMemoryTargetStore::new();
        assert!(!store.is_closed());
        store.close().await;
        assert!(store.is_closed());
    }
}
