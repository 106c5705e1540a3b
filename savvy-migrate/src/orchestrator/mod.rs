//! This module defines the `Orchestrator` responsible for executing a
//! migration plan.
//! It integrates the consumer, processor, and loader components and runs the
//! phases one after the other, awaiting every insert before the next.
use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::consumer::ExportConsumer;
use crate::context::MigrationContext;
use crate::errors::MigrationError;
use crate::loader::RecordLoader;
use crate::plan::{MigrationPlan, Phase};
use crate::processor::{ProcessedRecord, RecordProcessor};
use crate::report::{EntityReport, MigrationReport, write_audit_map};

/// Run-level switches of the orchestrator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrchestratorOptions {
    /// Apply the relational schema before the first phase.
    pub apply_schema: bool,
    /// Write the identifier map of the run to this directory when set.
    pub audit_dir: Option<PathBuf>,
}

/// `Orchestrator` is responsible for coordinating the consumption,
/// processing, and loading of legacy records.
pub struct Orchestrator {
    pub consumer: Box<ExportConsumer>,
    pub processor: Box<RecordProcessor>,
    pub loader: Box<RecordLoader>,
    pub options: OrchestratorOptions,
}

impl Orchestrator {
    /// Creates a new `Orchestrator` instance.
    ///
    /// # Arguments
    ///
    /// * `consumer` - A boxed `ExportConsumer` instance
    /// * `processor` - A boxed `RecordProcessor` instance
    /// * `loader` - A boxed `RecordLoader` instance
    /// * `options` - Run-level switches
    ///
    /// # Returns
    ///
    /// A new `Orchestrator` instance.
    pub fn new(
        consumer: Box<ExportConsumer>,
        processor: Box<RecordProcessor>,
        loader: Box<RecordLoader>,
        options: OrchestratorOptions,
    ) -> Self {
        Self {
            consumer,
            processor,
            loader,
            options,
        }
    }

    /// Runs every phase of `plan` against a fresh identifier map.
    ///
    /// The target store is closed before this method returns, whether the run
    /// succeeded or not. Rows inserted before a failure are kept.
    ///
    /// # Returns
    ///
    /// A `MigrationReport` with per-entity counters, or the first
    /// `MigrationError` encountered; the remaining phases are not executed.
    pub async fn run(&self, plan: &MigrationPlan) -> Result<MigrationReport, MigrationError> {
        let result = self.execute(plan).await;
        self.loader.close().await;
        result
    }

    async fn execute(&self, plan: &MigrationPlan) -> Result<MigrationReport, MigrationError> {
        let start_time = Instant::now();
        let mut context = MigrationContext::new();
        let mut report = MigrationReport::new();

        if self.options.apply_schema {
            info!("Applying relational schema...");
            self.loader.prepare().await?;
            info!("✓ Schema up to date");
        }

        info!(phases = plan.len(), "Starting migration");
        for phase in plan.phases() {
            let entity_report = self.run_phase(phase, &mut context).await?;
            report.push(entity_report);
        }
        report.set_elapsed(start_time.elapsed());

        if let Some(dir) = &self.options.audit_dir {
            let path = write_audit_map(dir, &context, &report)?;
            info!(path = %path.display(), mappings = context.len(), "✓ Wrote audit id map");
            report.audit_map = Some(path);
        }

        Ok(report)
    }

    async fn run_phase(
        &self,
        phase: &Phase,
        context: &mut MigrationContext,
    ) -> Result<EntityReport, MigrationError> {
        let spec = &phase.spec;
        info!(entity = spec.name, file = %phase.path.display(), "Migrating entity");

        let records = self.consumer.read(&phase.path).await?;
        let mut entity_report = EntityReport::new(spec.name, spec.table);
        entity_report.read = records.len();

        for (index, raw) in records.into_iter().enumerate() {
            let outcome = self.processor.process(
                spec,
                &phase.unavailable_references,
                index,
                raw,
                context,
            )?;

            let prepared = match outcome {
                ProcessedRecord::Skip(skipped) => {
                    warn!(
                        entity = spec.name,
                        index,
                        legacy_id = skipped.legacy_id.as_deref().unwrap_or("<none>"),
                        reason = %skipped.reason,
                        "Skipping record"
                    );
                    entity_report.skipped.push(skipped);
                    continue;
                }
                ProcessedRecord::Insert(prepared) => prepared,
            };

            for nulled in &prepared.nulled_references {
                warn!(
                    entity = spec.name,
                    index,
                    field = nulled.field,
                    references = nulled.references,
                    legacy_id = %nulled.legacy_id,
                    "Unknown optional reference stored as NULL"
                );
            }
            entity_report.nulled_references += prepared.nulled_references.len();

            let new_id = self
                .loader
                .load(spec.name, spec.table, index, &prepared.row)
                .await?;
            entity_report.inserted += 1;

            if !phase.is_reference_target {
                continue;
            }
            match prepared.legacy_id {
                Some(legacy_id) => {
                    if !context.record(spec.name, legacy_id.clone(), new_id) {
                        warn!(
                            entity = spec.name,
                            index,
                            legacy_id = %legacy_id,
                            "Duplicate legacy id; keeping the first mapping"
                        );
                        entity_report.duplicate_legacy_ids += 1;
                    }
                }
                None => {
                    warn!(
                        entity = spec.name,
                        index,
                        "Record has no legacy id and cannot be referenced"
                    );
                    entity_report.unmapped += 1;
                }
            }
        }

        info!(
            entity = spec.name,
            inserted = entity_report.inserted,
            skipped = entity_report.skipped_count(),
            mapped = context.mapped(spec.name),
            "✓ Migrated entity"
        );
        Ok(entity_report)
    }
}
