//! Domain types shared by the controllers and the backend client.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Decode an explicit `null` the same way as a missing field.
///
/// Pair with `#[serde(default)]` so both cases yield `T::default()`.
pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// A folder in the user's Drive, as listed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: String,
    pub name: String,
}

impl Folder {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// One file the backend processed during an import.
///
/// The shape is backend-defined; the client only counts these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProcessedFile(pub Value);

/// A file the backend declined to import.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedFile {
    pub filename: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Any further fields the backend attaches.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SkippedFile {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            reason: None,
            extra: Map::new(),
        }
    }
}

/// Outcome of a folder import.
///
/// A non-empty `skipped_files` is a partial success, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportResult {
    pub processes: Vec<ProcessedFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub skipped_files: Vec<SkippedFile>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}

impl ImportResult {
    pub fn imported_count(&self) -> usize {
        self.processes.len()
    }

    pub fn skipped_count(&self) -> usize {
        self.skipped_files.len()
    }

    pub fn is_partial(&self) -> bool {
        !self.skipped_files.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_import_result_defaults_optional_fields() {
        let result: ImportResult = serde_json::from_value(json!({
            "processes": [{"id": 1}, {"id": 2}]
        }))
        .unwrap();

        assert_eq!(result.imported_count(), 2);
        assert!(result.skipped_files.is_empty());
        assert!(result.message.is_empty());
        assert!(!result.is_partial());
    }

    #[test]
    fn test_import_result_accepts_null_optional_fields() {
        let result: ImportResult = serde_json::from_value(json!({
            "processes": [{"id": 1}],
            "skipped_files": null,
            "message": null
        }))
        .unwrap();

        assert_eq!(result.imported_count(), 1);
        assert_eq!(result.skipped_count(), 0);
        assert!(result.message.is_empty());
        assert!(!result.is_partial());
    }

    #[test]
    fn test_import_result_requires_processes() {
        let result = serde_json::from_value::<ImportResult>(json!({
            "skipped_files": [],
            "message": "ok"
        }));
        assert!(result.is_err());
    }

    #[test]
    fn test_skipped_file_keeps_extra_fields() {
        let skipped: SkippedFile = serde_json::from_value(json!({
            "filename": "x.pdf",
            "reason": "unsupported",
            "mime_type": "application/pdf"
        }))
        .unwrap();

        assert_eq!(skipped.filename, "x.pdf");
        assert_eq!(skipped.reason.as_deref(), Some("unsupported"));
        assert_eq!(skipped.extra.get("mime_type"), Some(&json!("application/pdf")));
    }
}
