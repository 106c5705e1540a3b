//! Error types raised while normalising legacy export values.
use thiserror::Error;

/// Errors that can occur while unwrapping extended JSON or coercing a legacy
/// value into a typed column.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ExtendedJsonError {
    #[error("Invalid $date value: {0}")]
    InvalidDate(String),

    #[error("Invalid numeric wrapper {wrapper}: {value}")]
    InvalidNumber { wrapper: String, value: String },

    #[error("Invalid $oid value: {0}")]
    InvalidObjectId(String),

    #[error("Column {column} expects {expected}, found {found}")]
    ColumnTypeMismatch {
        column: String,
        expected: String,
        found: String,
    },
}
