//! Error types for the consumer module.
//! Defines the errors raised while reading and parsing export files.
use std::path::PathBuf;

use thiserror::Error;

/// Represents errors that can occur while consuming an export file.
///
/// Every variant is fatal for the run: a file that cannot be read or parsed
/// means the entity type it holds cannot be migrated at all.
#[derive(Debug, Error)]
pub enum ConsumerError {
    #[error("Error reading export file {path}: {source}")]
    ReadingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error parsing export file {path}: {source}")]
    ParsingFile {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Export file {0} does not contain a JSON array")]
    NotAnArray(PathBuf),
}
