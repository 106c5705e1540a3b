use thiserror::Error;

/// Represents errors that can occur while writing migrated records.
#[derive(Debug, Error)]
pub enum TargetStoreError {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Schema migration error: {0}")]
    SchemaError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Insert into {table} rejected: {reason}")]
    Rejected { table: String, reason: String },
}
