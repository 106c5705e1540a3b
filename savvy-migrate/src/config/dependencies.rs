use std::sync::Arc;

use savvy_migrate_repository::{InMemoryTargetStore, PostgresTargetStore, TargetStore};
use tracing::info;

use crate::config::MigrationConfig;
use crate::config::settings::DATABASE_URL;
use crate::consumer::ExportConsumer;
use crate::errors::{ConfigError, LoaderError, MigrationError};
use crate::loader::RecordLoader;
use crate::orchestrator::{Orchestrator, OrchestratorOptions};
use crate::processor::RecordProcessor;

/// `Dependencies` holds the components of the migration pipeline.
///
/// It includes a consumer for reading export files, a processor for
/// resolving references, and a loader for persisting rows.
pub struct Dependencies {
    pub consumer: Box<ExportConsumer>,
    pub processor: Box<RecordProcessor>,
    pub loader: Box<RecordLoader>,
    pub options: OrchestratorOptions,
}

impl Dependencies {
    /// Creates a new `Dependencies` instance.
    ///
    /// Connects to PostgreSQL, or builds an in-memory store when the run is a
    /// dry run.
    ///
    /// # Arguments
    ///
    /// * `config` - Settings of the run
    ///
    /// # Returns
    ///
    /// A `Result` which is `Ok(Self)` on successful initialization or a
    /// `MigrationError` if the target store cannot be reached, or if a
    /// non-dry run has no database URL.
    pub async fn new(config: &MigrationConfig) -> Result<Self, MigrationError> {
        let target_store: Arc<dyn TargetStore> = match (&config.database_url, config.dry_run) {
            (Some(database_url), false) => {
                info!("Connecting to PostgreSQL...");
                let store = PostgresTargetStore::connect(database_url, config.max_connections)
                    .await
                    .map_err(LoaderError::from)?;
                info!("✓ Connected to PostgreSQL");
                Arc::new(store)
            }
            (_, true) => {
                info!("Dry run: rows are kept in memory and discarded");
                Arc::new(InMemoryTargetStore::new())
            }
            (None, false) => return Err(ConfigError::MissingVar(DATABASE_URL).into()),
        };

        Ok(Self::with_store(config, target_store))
    }

    /// Builds the pipeline around an already constructed store.
    pub fn with_store(config: &MigrationConfig, target_store: Arc<dyn TargetStore>) -> Self {
        Self {
            consumer: Box::new(ExportConsumer::new()),
            processor: Box::new(RecordProcessor::new()),
            loader: Box::new(RecordLoader::new(target_store)),
            options: OrchestratorOptions {
                apply_schema: config.apply_schema,
                audit_dir: config.audit_dir.clone(),
            },
        }
    }

    /// Consumes the dependencies into an `Orchestrator`.
    pub fn into_orchestrator(self) -> Orchestrator {
        Orchestrator::new(self.consumer, self.processor, self.loader, self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    use crate::plan::EntitySelection;

    fn dry_run_config() -> MigrationConfig {
        MigrationConfig {
            database_url: None,
            export_dir: PathBuf::from("./data"),
            selection: EntitySelection::defaults(),
            dry_run: true,
            audit_dir: Some(PathBuf::from("/tmp/audit")),
            max_connections: 1,
            apply_schema: false,
        }
    }

    #[tokio::test]
    async fn test_dry_run_uses_in_memory_store() {
        let dependencies = Dependencies::new(&dry_run_config()).await.unwrap();

        assert_eq!(dependencies.loader.target_store.count("users").await.unwrap(), 0);
        assert!(!dependencies.options.apply_schema);
        assert_eq!(dependencies.options.audit_dir, Some(PathBuf::from("/tmp/audit")));
    }

    #[tokio::test]
    async fn test_dry_run_ignores_database_url() {
        let mut config = dry_run_config();
        config.database_url = Some("not-a-url".to_string());

        let dependencies = Dependencies::new(&config).await.unwrap();
        assert_eq!(dependencies.loader.target_store.count("users").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_database_url_outside_dry_run_is_an_error() {
        let mut config = dry_run_config();
        config.dry_run = false;

        let result = Dependencies::new(&config).await;
        assert!(matches!(
            result,
            Err(MigrationError::Config(ConfigError::MissingVar("DATABASE_URL")))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_database_is_an_error() {
        let mut config = dry_run_config();
        config.dry_run = false;
        config.database_url = Some("not-a-url".to_string());

        let result = Dependencies::new(&config).await;
        assert!(matches!(result, Err(MigrationError::Loader(LoaderError::TargetStore(_)))));
    }
}
