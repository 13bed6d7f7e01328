//! Backend wire types
//!
//! Request bodies for the four `/google/*` endpoints. Response bodies reuse
//! the domain types from `core_runtime::models`.

use core_runtime::models::null_as_default;
use serde::{Deserialize, Serialize};

pub use core_runtime::models::{Folder, ImportResult, ProcessedFile, SkippedFile};

/// `POST /google/auth` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthExchangeRequest {
    pub code: String,
    pub redirect_uri: String,
}

/// `POST /google/import` body
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportRequest {
    #[serde(rename = "folderId")]
    pub folder_id: String,
}

/// `POST /google/export` body
///
/// `folderId` is always present; `None` is sent as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportRequest {
    #[serde(rename = "textIds")]
    pub text_ids: Vec<String>,
    #[serde(rename = "folderId")]
    pub folder_id: Option<String>,
}

/// `POST /google/export` success body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
}
