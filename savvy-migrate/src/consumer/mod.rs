//! Consumer module of the migration pipeline.
//!
//! Reads one export file per entity type. The file must hold a single JSON
//! array; its elements are handed to the processor untouched, so a malformed
//! element only affects its own record.
use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::errors::ConsumerError;

/// `ExportConsumer` reads legacy export files from disk.
#[derive(Debug, Default, Clone)]
pub struct ExportConsumer;

impl ExportConsumer {
    pub fn new() -> Self {
        Self
    }

    /// Reads and parses an export file.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of the export file
    ///
    /// # Returns
    ///
    /// The elements of the top-level JSON array, in file order, or a
    /// `ConsumerError` if the file is missing, is not valid JSON, or is not
    /// an array.
    pub async fn read(&self, path: &Path) -> Result<Vec<Value>, ConsumerError> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConsumerError::ReadingFile {
                path: path.to_path_buf(),
                source,
            })?;

        let parsed: Value =
            serde_json::from_str(&contents).map_err(|source| ConsumerError::ParsingFile {
                path: path.to_path_buf(),
                source,
            })?;

        match parsed {
            Value::Array(records) => {
                debug!(file = %path.display(), records = records.len(), "Read export file");
                Ok(records)
            }
            _ => Err(ConsumerError::NotAnArray(path.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn export_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[tokio::test]
    async fn test_read_array_keeps_order_and_elements() {
        let file = export_file(r#"[{"_id": "a"}, 42, {"_id": {"$oid": "b"}}]"#);
        let records = ExportConsumer::new().read(file.path()).await.unwrap();

        assert_eq!(
            records,
            vec![json!({"_id": "a"}), json!(42), json!({"_id": {"$oid": "b"}})]
        );
    }

    #[tokio::test]
    async fn test_read_empty_array() {
        let file = export_file("[]");
        assert!(ExportConsumer::new().read(file.path()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("users.json");

        let err = ExportConsumer::new().read(&path).await.unwrap_err();
        assert!(matches!(err, ConsumerError::ReadingFile { path: p, .. } if p == path));
    }

    #[tokio::test]
    async fn test_non_array_is_an_error() {
        let file = export_file(r#"{"users": []}"#);
        let err = ExportConsumer::new().read(file.path()).await.unwrap_err();
        assert!(matches!(err, ConsumerError::NotAnArray(_)));
    }

    #[tokio::test]
    async fn test_invalid_json_is_an_error() {
        let file = export_file("[{\"_id\": ");
        let err = ExportConsumer::new().read(file.path()).await.unwrap_err();
        assert!(matches!(err, ConsumerError::ParsingFile { .. }));
    }
}
