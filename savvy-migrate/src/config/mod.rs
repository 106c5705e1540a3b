//! Configuration module for the migration.
//! Reads application settings from the environment and wires the pipeline
//! components together.
mod dependencies;
mod settings;

pub use dependencies::Dependencies;
pub use settings::MigrationConfig;
