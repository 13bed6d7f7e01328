//! Import backend connector
//!
//! Typed client for the backend's Google Drive endpoints. Every request is
//! sent with credentials included so the session cookie established by
//! [`GoogleDriveBackend::exchange_code`] travels with later calls.

use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::error::{GoogleDriveError, Result};
use crate::types::{
    AuthExchangeRequest, ExportRequest, ExportResult, Folder, ImportRequest, ImportResult,
};

const AUTH_PATH: &str = "/google/auth";
const FOLDERS_PATH: &str = "/google/folders";
const IMPORT_PATH: &str = "/google/import";
const EXPORT_PATH: &str = "/google/export";

/// Raw bodies longer than this are not shown to the user.
const MAX_RAW_ERROR_LEN: usize = 200;

/// Client for the import backend
///
/// # Example
///
/// ```ignore
/// use provider_google_drive::GoogleDriveBackend;
///
/// let backend = GoogleDriveBackend::new(http_client, "http://localhost:8000")?;
/// backend.exchange_code("4/0Ab...", "http://localhost:5173/callback").await?;
/// let folders = backend.list_folders().await?;
/// ```
pub struct GoogleDriveBackend {
    http_client: Arc<dyn HttpClient>,
    base_url: String,
    timeout: Option<Duration>,
}

impl GoogleDriveBackend {
    /// Create a new backend client
    ///
    /// # Errors
    ///
    /// `InvalidUrl` if `base_url` is not an absolute http(s) URL.
    pub fn new(http_client: Arc<dyn HttpClient>, base_url: &str) -> Result<Self> {
        let parsed = Url::parse(base_url)
            .map_err(|e| GoogleDriveError::InvalidUrl(format!("{}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() || !matches!(parsed.scheme(), "http" | "https") {
            return Err(GoogleDriveError::InvalidUrl(base_url.to_string()));
        }

        Ok(Self {
            http_client,
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout: None,
        })
    }

    /// Per-request timeout passed to the transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: HttpMethod, path: &str) -> HttpRequest {
        let mut request = HttpRequest::new(method, self.endpoint(path))
            .header("Accept", "application/json")
            .with_credentials();
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }
        request
    }

    fn post_json<T: Serialize>(&self, path: &str, body: &T) -> Result<HttpRequest> {
        Ok(self.request(HttpMethod::Post, path).json(body)?)
    }

    /// Send a request and require a 2xx status.
    ///
    /// The body of a failed response is only inspected for an error message;
    /// it is never decoded as the success type.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| GoogleDriveError::Transport(e.to_string()))?;

        if response.is_success() {
            return Ok(response);
        }

        let message = extract_error_message(&response);
        warn!(status = response.status, "Backend request failed");
        Err(GoogleDriveError::RequestFailed {
            status: response.status,
            message,
        })
    }

    fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T> {
        serde_json::from_slice(&response.body)
            .map_err(|e| GoogleDriveError::ParseError(e.to_string()))
    }

    /// Exchange an authorization code for a backend-managed session.
    ///
    /// Only the status matters; the response body is ignored.
    #[instrument(skip(self, code))]
    pub async fn exchange_code(&self, code: &str, redirect_uri: &str) -> Result<()> {
        let body = AuthExchangeRequest {
            code: code.to_string(),
            redirect_uri: redirect_uri.to_string(),
        };

        self.send(self.post_json(AUTH_PATH, &body)?).await?;
        info!("Authorization code exchanged");
        Ok(())
    }

    /// List the user's Drive folders.
    #[instrument(skip(self))]
    pub async fn list_folders(&self) -> Result<Vec<Folder>> {
        let response = self.send(self.request(HttpMethod::Get, FOLDERS_PATH)).await?;
        let folders: Vec<Folder> = Self::decode(&response)?;
        debug!(count = folders.len(), "Listed folders");
        Ok(folders)
    }

    /// Import every file of a folder into the backend.
    #[instrument(skip(self))]
    pub async fn import_folder(&self, folder_id: &str) -> Result<ImportResult> {
        let body = ImportRequest {
            folder_id: folder_id.to_string(),
        };

        let response = self.send(self.post_json(IMPORT_PATH, &body)?).await?;
        let result: ImportResult = Self::decode(&response)?;
        debug!(
            imported = result.imported_count(),
            skipped = result.skipped_count(),
            "Import response decoded"
        );
        Ok(result)
    }

    /// Export documents to Drive.
    #[instrument(skip(self, request), fields(documents = request.text_ids.len()))]
    pub async fn export_documents(&self, request: &ExportRequest) -> Result<ExportResult> {
        let response = self.send(self.post_json(EXPORT_PATH, request)?).await?;
        Self::decode(&response)
    }
}

/// Best-effort human-readable message from a failed response.
///
/// Prefers a `detail`, `message` or `error` field of a JSON body, then a
/// short plain-text body, then a generic message with the status.
pub fn extract_error_message(response: &HttpResponse) -> String {
    if let Ok(Value::Object(map)) = serde_json::from_slice::<Value>(&response.body) {
        for key in ["detail", "message", "error"] {
            match map.get(key) {
                Some(Value::String(text)) => {
                    if !text.trim().is_empty() {
                        return text.clone();
                    }
                }
                Some(Value::Null) | None => {}
                Some(other) => return other.to_string(),
            }
        }
    }

    if let Ok(text) = response.text() {
        let text = text.trim();
        if !text.is_empty() && text.len() <= MAX_RAW_ERROR_LEN {
            return text.to_string();
        }
    }

    format!("Request failed with status {}", response.status)
}
