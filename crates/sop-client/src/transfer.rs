//! Whole-collection backup: JSON export and import parsing.
//!
//! Export serializes the in-memory collection to a pretty-printed JSON
//! array. Import parses a user-supplied file; malformed JSON surfaces as a
//! parse error before anything touches the store or the remote collection.

use crate::error::ClientError;
use sop_core::model::Document;
use std::path::Path;

/// Default backup filename, matching what the web app downloads.
pub const BACKUP_FILENAME: &str = "sop-backup.json";

/// Serialize the collection for download/backup.
pub fn export_json(docs: &[Document]) -> Result<String, ClientError> {
    serde_json::to_string_pretty(docs).map_err(|e| ClientError::Parse(e.to_string()))
}

/// Parse an import payload. The result still has to be confirmed and pushed
/// through the store's `import` to take effect.
pub fn parse_import(text: &str) -> Result<Vec<Document>, ClientError> {
    serde_json::from_str(text).map_err(|e| ClientError::Parse(e.to_string()))
}

/// Write the backup file to disk.
pub async fn write_backup(path: &Path, docs: &[Document]) -> Result<(), ClientError> {
    let json = export_json(docs)?;
    tokio::fs::write(path, json)
        .await
        .map_err(|e| ClientError::Parse(format!("could not write {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn export_then_parse_round_trips() {
        let docs = vec![Document::new("sop-1", "First"), Document::new("sop-2", "Second")];
        let json = export_json(&docs).unwrap();
        assert_eq!(parse_import(&json).unwrap(), docs);
    }

    #[test]
    fn malformed_json_is_a_parse_error() {
        let err = parse_import("{not valid").unwrap_err();
        assert!(matches!(err, ClientError::Parse(_)));
    }

    #[test]
    fn import_must_be_an_array_of_documents() {
        assert!(parse_import(r#"{"id":"sop-1","name":"not an array"}"#).is_err());
        assert!(parse_import(r#"[{"id":"sop-1","name":"ok"}]"#).is_ok());
    }

    #[tokio::test]
    async fn backup_file_lands_on_disk() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join(BACKUP_FILENAME);
        let docs = vec![Document::new("sop-1", "First")];

        write_backup(&path, &docs).await.unwrap();

        let text = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(parse_import(&text).unwrap(), docs);
    }
}
