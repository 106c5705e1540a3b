//! Error types for reading the migration configuration from the environment.
use thiserror::Error;

/// Represents errors that can occur while building a `MigrationConfig`.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    MissingVar(&'static str),
    #[error("Invalid value for {name}: {value:?}")]
    InvalidVar { name: &'static str, value: String },
}
