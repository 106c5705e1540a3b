//! # Savvy Migrate
//!
//! One-shot migration of the SmartSavvy document-database exports into the
//! relational schema. Each entity type is read from its export file, its
//! foreign keys are translated from legacy document ids to relational ids,
//! and the resulting row is inserted through a [`TargetStore`].
//!
//! The crate is organised like an ingest pipeline:
//!
//! - [`consumer`] reads and parses export files
//! - [`processor`] resolves foreign keys and builds typed rows
//! - [`loader`] writes rows to the target store
//! - [`orchestrator`] drives the phases of a [`plan::MigrationPlan`] in order
//!
//! [`TargetStore`]: savvy_migrate_repository::TargetStore
pub mod catalog;
pub mod config;
pub mod consumer;
pub mod context;
pub mod errors;
pub mod loader;
pub mod orchestrator;
pub mod plan;
pub mod processor;
pub mod report;

pub use config::{Dependencies, MigrationConfig};
pub use context::MigrationContext;
pub use errors::MigrationError;
pub use orchestrator::Orchestrator;
pub use plan::{EntitySelection, MigrationPlan};
pub use report::MigrationReport;
