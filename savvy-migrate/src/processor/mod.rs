//! This module defines the `RecordProcessor`, which turns one legacy export
//! element into a relational row.
//!
//! Foreign keys are translated through the run's [`MigrationContext`]. A
//! required reference that cannot be translated skips the record; an optional
//! one is stored as NULL. A row is never produced with a dangling reference.
use std::fmt;

use savvy_migrate_shared::types::{ColumnValue, EntitySpec, LegacyRecord, NewRow, legacy_id_of};
use serde::Serialize;
use serde_json::Value;

use crate::context::MigrationContext;
use crate::errors::ProcessorError;

/// Why a record was left out of the migration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// The export element is not a JSON object.
    NotAnObject,
    /// A required foreign-key field is absent, null or not an id.
    MissingReference { field: &'static str },
    /// A required foreign key names a legacy id that was never migrated.
    UnresolvedReference {
        field: &'static str,
        references: &'static str,
        legacy_id: String,
    },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::NotAnObject => write!(f, "element is not an object"),
            SkipReason::MissingReference { field } => {
                write!(f, "required reference {field} is missing")
            }
            SkipReason::UnresolvedReference {
                field,
                references,
                legacy_id,
            } => write!(f, "{field} points at unknown {references} {legacy_id}"),
        }
    }
}

/// A record that was not inserted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedRecord {
    /// Position of the element in its export file.
    pub index: usize,
    pub legacy_id: Option<String>,
    pub reason: SkipReason,
}

/// An optional reference that could not be resolved and was stored as NULL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NulledReference {
    pub field: &'static str,
    pub references: &'static str,
    pub legacy_id: String,
}

/// A row ready to be inserted.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRow {
    pub legacy_id: Option<String>,
    pub row: NewRow,
    pub nulled_references: Vec<NulledReference>,
}

/// Outcome of processing one export element.
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessedRecord {
    Insert(PreparedRow),
    Skip(SkippedRecord),
}

/// `RecordProcessor` builds typed rows from legacy records.
#[derive(Debug, Default, Clone)]
pub struct RecordProcessor;

impl RecordProcessor {
    pub fn new() -> Self {
        Self
    }

    /// Processes one export element.
    ///
    /// # Arguments
    ///
    /// * `spec` - The entity type the element belongs to
    /// * `unavailable` - Optional foreign-key fields whose target type is not
    ///   part of the run; they are stored as NULL without being looked up
    /// * `index` - Position of the element in its export file
    /// * `raw` - The element as read from the file
    /// * `context` - Identifier map of the current run
    ///
    /// # Returns
    ///
    /// The row to insert or the reason the record is skipped. A
    /// `ProcessorError` is returned only for data that cannot be coerced into
    /// the target schema, which aborts the run.
    pub fn process(
        &self,
        spec: &EntitySpec,
        unavailable: &[&'static str],
        index: usize,
        raw: Value,
        context: &MigrationContext,
    ) -> Result<ProcessedRecord, ProcessorError> {
        let malformed = |source| ProcessorError::MalformedRecord {
            entity: spec.name,
            index,
            source,
        };

        let Some(record) = LegacyRecord::from_export(raw).map_err(malformed)? else {
            return Ok(ProcessedRecord::Skip(SkippedRecord {
                index,
                legacy_id: None,
                reason: SkipReason::NotAnObject,
            }));
        };
        let legacy_id = record.legacy_id();

        let mut row = NewRow::new();
        let mut nulled_references = Vec::new();

        for fk in &spec.foreign_keys {
            if unavailable.contains(&fk.field) {
                row.push(fk.column, ColumnValue::Text(None));
                continue;
            }

            let Some(referenced) = record.get(fk.field).and_then(legacy_id_of) else {
                if fk.required {
                    return Ok(ProcessedRecord::Skip(SkippedRecord {
                        index,
                        legacy_id,
                        reason: SkipReason::MissingReference { field: fk.field },
                    }));
                }
                row.push(fk.column, ColumnValue::Text(None));
                continue;
            };

            match context.resolve(fk.references, &referenced) {
                Some(new_id) => row.push(fk.column, ColumnValue::Text(Some(new_id.to_string()))),
                None if fk.required => {
                    return Ok(ProcessedRecord::Skip(SkippedRecord {
                        index,
                        legacy_id,
                        reason: SkipReason::UnresolvedReference {
                            field: fk.field,
                            references: fk.references,
                            legacy_id: referenced,
                        },
                    }));
                }
                None => {
                    row.push(fk.column, ColumnValue::Text(None));
                    nulled_references.push(NulledReference {
                        field: fk.field,
                        references: fk.references,
                        legacy_id: referenced,
                    });
                }
            }
        }

        for column in &spec.columns {
            let value = ColumnValue::from_legacy(column.column, column.kind, record.get(column.field))
                .map_err(malformed)?;
            row.push(column.column, value);
        }

        Ok(ProcessedRecord::Insert(PreparedRow {
            legacy_id,
            row,
            nulled_references,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savvy_migrate_shared::ExtendedJsonError;
    use savvy_migrate_shared::types::ColumnKind;
    use serde_json::json;

    fn links() -> EntitySpec {
        EntitySpec::new("links", "links.json", "links")
            .requires("userId", "user_id", "users")
            .optional("genreId", "genre_id", "genres")
            .column("title", "title", ColumnKind::Text)
            .column("clicks", "clicks", ColumnKind::Integer)
            .column("createdAt", "created_at", ColumnKind::Timestamp)
    }

    fn context() -> MigrationContext {
        let mut context = MigrationContext::new();
        context.record("users", "u1".to_string(), "user-row".to_string());
        context.record("genres", "g1".to_string(), "genre-row".to_string());
        context
    }

    fn insert(outcome: ProcessedRecord) -> PreparedRow {
        match outcome {
            ProcessedRecord::Insert(prepared) => prepared,
            ProcessedRecord::Skip(skipped) => panic!("unexpected skip: {skipped:?}"),
        }
    }

    fn skip(outcome: ProcessedRecord) -> SkippedRecord {
        match outcome {
            ProcessedRecord::Skip(skipped) => skipped,
            ProcessedRecord::Insert(prepared) => panic!("unexpected insert: {prepared:?}"),
        }
    }

    #[test]
    fn test_resolves_references_and_copies_columns() {
        let raw = json!({
            "_id": {"$oid": "l1"},
            "userId": {"$oid": "u1"},
            "genreId": "g1",
            "title": "Song",
            "clicks": {"$numberLong": "12"},
            "createdAt": {"$date": "2023-04-05T10:11:12Z"},
            "ignored": true
        });

        let prepared = insert(RecordProcessor::new().process(&links(), &[], 0, raw, &context()).unwrap());

        assert_eq!(prepared.legacy_id.as_deref(), Some("l1"));
        assert!(prepared.nulled_references.is_empty());
        assert_eq!(prepared.row.get("user_id").unwrap().as_text(), Some("user-row"));
        assert_eq!(prepared.row.get("genre_id").unwrap().as_text(), Some("genre-row"));
        assert_eq!(prepared.row.get("title").unwrap().as_text(), Some("Song"));
        assert_eq!(prepared.row.get("clicks"), Some(&ColumnValue::Integer(Some(12))));
        assert!(matches!(prepared.row.get("created_at"), Some(ColumnValue::Timestamp(Some(_)))));
        assert_eq!(prepared.row.values.len(), 5);
    }

    #[test]
    fn test_unknown_required_reference_skips() {
        let raw = json!({"_id": "l1", "userId": "ghost"});
        let skipped = skip(RecordProcessor::new().process(&links(), &[], 3, raw, &context()).unwrap());

        assert_eq!(skipped.index, 3);
        assert_eq!(skipped.legacy_id.as_deref(), Some("l1"));
        assert_eq!(
            skipped.reason,
            SkipReason::UnresolvedReference {
                field: "userId",
                references: "users",
                legacy_id: "ghost".to_string(),
            }
        );
    }

    #[test]
    fn test_absent_required_reference_skips() {
        let records = [
            json!({"_id": "l1"}),
            json!({"_id": "l1", "userId": null}),
            json!({"_id": "l1", "userId": "  "}),
        ];
        for raw in records {
            let skipped = skip(RecordProcessor::new().process(&links(), &[], 0, raw, &context()).unwrap());
            assert_eq!(skipped.reason, SkipReason::MissingReference { field: "userId" });
        }
    }

    #[test]
    fn test_unknown_optional_reference_is_nulled() {
        let raw = json!({"_id": "l1", "userId": "u1", "genreId": "g-missing"});
        let prepared = insert(RecordProcessor::new().process(&links(), &[], 0, raw, &context()).unwrap());

        assert_eq!(prepared.row.get("genre_id"), Some(&ColumnValue::Text(None)));
        assert_eq!(
            prepared.nulled_references,
            vec![NulledReference {
                field: "genreId",
                references: "genres",
                legacy_id: "g-missing".to_string(),
            }]
        );
    }

    #[test]
    fn test_absent_optional_reference_is_null_without_report() {
        let raw = json!({"_id": "l1", "userId": "u1"});
        let prepared = insert(RecordProcessor::new().process(&links(), &[], 0, raw, &context()).unwrap());

        assert_eq!(prepared.row.get("genre_id"), Some(&ColumnValue::Text(None)));
        assert!(prepared.nulled_references.is_empty());
    }

    #[test]
    fn test_unavailable_reference_is_not_looked_up() {
        let raw = json!({"_id": "l1", "userId": "u1", "genreId": "g1"});
        let prepared =
            insert(RecordProcessor::new().process(&links(), &["genreId"], 0, raw, &context()).unwrap());

        assert_eq!(prepared.row.get("genre_id"), Some(&ColumnValue::Text(None)));
        assert!(prepared.nulled_references.is_empty());
    }

    #[test]
    fn test_record_without_legacy_id_is_still_inserted() {
        let raw = json!({"userId": "u1", "title": "No id"});
        let prepared = insert(RecordProcessor::new().process(&links(), &[], 0, raw, &context()).unwrap());
        assert_eq!(prepared.legacy_id, None);
    }

    #[test]
    fn test_non_object_is_skipped() {
        let outcome = RecordProcessor::new().process(&links(), &[], 7, json!("oops"), &context());
        let skipped = skip(outcome.unwrap());
        assert_eq!(skipped.reason, SkipReason::NotAnObject);
        assert_eq!(skipped.legacy_id, None);
    }

    #[test]
    fn test_uncoercible_value_is_an_error() {
        let raw = json!({"_id": "l1", "userId": "u1", "clicks": "many"});
        let err = RecordProcessor::new().process(&links(), &[], 2, raw, &context()).unwrap_err();

        let ProcessorError::MalformedRecord { entity, index, source } = err;
        assert_eq!(entity, "links");
        assert_eq!(index, 2);
        assert!(matches!(source, ExtendedJsonError::ColumnTypeMismatch { .. }));
    }

    #[test]
    fn test_malformed_wrapper_is_an_error() {
        let raw = json!({"_id": "l1", "userId": "u1", "createdAt": {"$date": "not a date"}});
        let err = RecordProcessor::new().process(&links(), &[], 0, raw, &context()).unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::MalformedRecord { source: ExtendedJsonError::InvalidDate(_), .. }
        ));
    }

    #[test]
    fn test_self_reference_resolves_against_earlier_rows() {
        let comments = EntitySpec::new("comments", "comments.json", "comments")
            .optional("parentId", "parent_id", "comments");
        let mut context = MigrationContext::new();
        context.record("comments", "c1".to_string(), "comment-row".to_string());

        let raw = json!({"_id": "c2", "parentId": "c1"});
        let prepared = insert(RecordProcessor::new().process(&comments, &[], 1, raw, &context).unwrap());
        assert_eq!(prepared.row.get("parent_id").unwrap().as_text(), Some("comment-row"));
    }
}
