use serde::{Deserialize, Serialize};

/// One stored file as reported by the listing endpoint.
///
/// Records are read-only on the client and rendered in the order the
/// server returns them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    pub id: i64,
    pub filename: String,
    #[serde(default)]
    pub content_type: Option<String>,
}

impl FileRecord {
    /// Content type for display, with a generic default when the server
    /// did not record one
    pub fn content_type_display(&self) -> &str {
        self.content_type
            .as_deref()
            .unwrap_or("application/octet-stream")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_record() {
        let json = r#"{"id": 7, "filename": "report.pdf", "content_type": "application/pdf"}"#;
        let record: FileRecord = serde_json::from_str(json)
            .expect("Failed to parse file record test JSON");

        assert_eq!(record.id, 7);
        assert_eq!(record.filename, "report.pdf");
        assert_eq!(record.content_type_display(), "application/pdf");
    }

    #[test]
    fn test_missing_content_type_defaults() {
        let json = r#"{"id": 1, "filename": "blob"}"#;
        let record: FileRecord = serde_json::from_str(json)
            .expect("Failed to parse file record test JSON");

        assert!(record.content_type.is_none());
        assert_eq!(record.content_type_display(), "application/octet-stream");
    }
}
