//! Error types for building a migration plan.
use thiserror::Error;

/// Represents errors found while ordering the entity catalog into phases.
///
/// All of these are configuration mistakes and are reported before any
/// record is read.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum PlanError {
    #[error("Entity type {0} is declared more than once")]
    DuplicateEntity(String),
    #[error("{entity}.{field} references unknown entity type {references}")]
    UnknownEntity {
        entity: String,
        field: String,
        references: String,
    },
    #[error("Unknown entity type in selection: {0}")]
    UnknownSelection(String),
    #[error("{entity}.{field} requires {dependency}, which is excluded from this run")]
    MissingDependency {
        entity: String,
        field: String,
        dependency: String,
    },
    #[error("Self-reference {entity}.{field} must be optional")]
    RequiredSelfReference { entity: String, field: String },
    /// Entity types that can never be ordered: members of a dependency cycle
    /// and every type that depends on one.
    #[error("Unresolvable entity types (dependency cycle): {}", .0.join(", "))]
    UnresolvableDependencies(Vec<String>),
}
