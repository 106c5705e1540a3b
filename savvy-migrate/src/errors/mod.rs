mod config;
mod consumer;
mod loader;
mod migration;
mod plan;
mod processor;

pub use config::ConfigError;
pub use consumer::ConsumerError;
pub use loader::LoaderError;
pub use migration::MigrationError;
pub use plan::PlanError;
pub use processor::ProcessorError;
