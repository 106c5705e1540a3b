//! Error types for the processor module.
use savvy_migrate_shared::ExtendedJsonError;
use thiserror::Error;

/// Represents errors that can occur while turning a legacy record into a row.
///
/// Unresolved references are not errors; they are reported as skipped records.
/// Only malformed data that cannot be coerced into the target schema ends up here.
#[derive(Debug, Error)]
pub enum ProcessorError {
    #[error("Malformed record #{index} in {entity}: {source}")]
    MalformedRecord {
        entity: &'static str,
        index: usize,
        #[source]
        source: ExtendedJsonError,
    },
}
