//! Error types for a migration run.
//! Consolidates errors from every stage so a run fails with a single type.
use std::path::PathBuf;

use thiserror::Error;

use super::{ConfigError, ConsumerError, LoaderError, PlanError, ProcessorError};

/// Represents every fatal error of a migration run.
///
/// Anything that reaches this type aborts the remaining phases.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),
    #[error("Consumer error: {0}")]
    Consumer(#[from] ConsumerError),
    #[error("Processor error: {0}")]
    Processor(#[from] ProcessorError),
    #[error("Loader error: {0}")]
    Loader(#[from] LoaderError),
    #[error("Error writing audit map {path}: {source}")]
    Audit {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error serializing audit map: {0}")]
    AuditSerialization(#[from] serde_json::Error),
}
