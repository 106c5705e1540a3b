//! Run report and audit id map.
//!
//! The report is returned by every successful run. When an audit directory is
//! configured, the identifier map of the run is also written to
//! `id-map-<timestamp>.json` together with the report so the legacy to
//! relational translation can be inspected after the process exits. An
//! existing file is never overwritten; a numeric suffix is added instead.
use std::fs::{self, File, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::context::MigrationContext;
use crate::errors::MigrationError;
use crate::processor::SkippedRecord;

/// Counters for one phase of a run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EntityReport {
    pub entity: &'static str,
    pub table: &'static str,
    /// Elements found in the export file.
    pub read: usize,
    pub inserted: usize,
    pub skipped: Vec<SkippedRecord>,
    /// Optional references stored as NULL because their target was unknown.
    pub nulled_references: usize,
    /// Records whose legacy id was already mapped; the first mapping was kept.
    pub duplicate_legacy_ids: usize,
    /// Inserted records that cannot be referenced because they have no legacy id.
    pub unmapped: usize,
}

impl EntityReport {
    pub fn new(entity: &'static str, table: &'static str) -> Self {
        Self {
            entity,
            table,
            ..Self::default()
        }
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped.len()
    }
}

/// Outcome of a successful migration run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MigrationReport {
    pub entities: Vec<EntityReport>,
    pub elapsed_ms: u64,
    /// Where the audit map was written, if one was requested.
    pub audit_map: Option<PathBuf>,
}

impl MigrationReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entity: EntityReport) {
        self.entities.push(entity);
    }

    pub fn set_elapsed(&mut self, elapsed: Duration) {
        self.elapsed_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
    }

    pub fn entity(&self, name: &str) -> Option<&EntityReport> {
        self.entities.iter().find(|report| report.entity == name)
    }

    pub fn total_inserted(&self) -> usize {
        self.entities.iter().map(|report| report.inserted).sum()
    }

    pub fn total_skipped(&self) -> usize {
        self.entities.iter().map(EntityReport::skipped_count).sum()
    }

    /// Logs one line per entity type and a total.
    pub fn log_summary(&self) {
        info!("=== Migration Complete ===");
        for report in &self.entities {
            info!(
                entity = report.entity,
                read = report.read,
                inserted = report.inserted,
                skipped = report.skipped_count(),
                nulled_references = report.nulled_references,
                "Entity summary"
            );
        }
        info!(
            inserted = self.total_inserted(),
            skipped = self.total_skipped(),
            "Total time: {:.2}s",
            self.elapsed_ms as f64 / 1000.0
        );
    }
}

#[derive(Debug, Serialize)]
struct AuditMapEntry<'a> {
    legacy_id: &'a str,
    new_id: &'a str,
}

/// Writes the identifier map and the report of a run to `dir`.
///
/// # Arguments
///
/// * `dir` - Audit directory; created if missing
/// * `context` - Identifier map of the finished run
/// * `report` - Counters of the finished run
///
/// # Returns
///
/// The path of the written file.
pub fn write_audit_map(
    dir: &Path,
    context: &MigrationContext,
    report: &MigrationReport,
) -> Result<PathBuf, MigrationError> {
    let io_error = |path: &Path| {
        let path = path.to_path_buf();
        move |source| MigrationError::Audit { path, source }
    };

    fs::create_dir_all(dir).map_err(io_error(dir))?;

    let timestamp = Utc::now();
    let stem = format!("id-map-{}", timestamp.format("%Y%m%dT%H%M%S%3fZ"));

    let id_map: serde_json::Map<String, serde_json::Value> = context
        .entries()
        .into_iter()
        .map(|(entity, entries)| {
            let entries: Vec<AuditMapEntry> = entries
                .into_iter()
                .map(|(legacy_id, new_id)| AuditMapEntry { legacy_id, new_id })
                .collect();
            serde_json::to_value(entries).map(|value| (entity.to_string(), value))
        })
        .collect::<Result<_, serde_json::Error>>()?;

    let payload = json!({
        "generated_at": timestamp.to_rfc3339(),
        "elapsed_ms": report.elapsed_ms,
        "entities": report.entities,
        "id_map": id_map,
    });

    let serialized = serde_json::to_string_pretty(&payload)?;
    let (path, mut file) = create_audit_file(dir, &stem)?;
    file.write_all(serialized.as_bytes())
        .map_err(io_error(&path))?;
    Ok(path)
}

/// Creates `<stem>.json` in `dir`, or `<stem>-<n>.json` for the first free `n`.
fn create_audit_file(dir: &Path, stem: &str) -> Result<(PathBuf, File), MigrationError> {
    let mut attempt = 0_u32;
    loop {
        let name = match attempt {
            0 => format!("{stem}.json"),
            n => format!("{stem}-{n}.json"),
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(source) if source.kind() == ErrorKind::AlreadyExists => attempt += 1,
            Err(source) => return Err(MigrationError::Audit { path, source }),
        }
    }
}
