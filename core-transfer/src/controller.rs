//! Import and export orchestration.
//!
//! Each import attempt moves the view state through
//! `Idle -> Importing -> (Success | Failed) -> Idle`. Only one import may be in
//! flight per controller; a second call is rejected before it touches state
//! or the network. Exports are not guarded.

use core_runtime::events::{CoreEvent, EventBus, TransferEvent};
use core_runtime::messages::Messages;
use core_runtime::models::ImportResult;
use core_runtime::state::{StateStore, StatusMessage};
use provider_google_drive::{ExportRequest, ExportResult, GoogleDriveBackend};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::error::{Result, TransferError};

// ============================================================================
// ID Types
// ============================================================================

/// Correlation id for one import attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImportAttemptId(Uuid);

impl ImportAttemptId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_str(&self) -> String {
        self.0.to_string()
    }
}

impl Default for ImportAttemptId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ImportAttemptId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Form helpers
// ============================================================================

/// Split a comma-separated list of document ids.
///
/// Ids are opaque and validated by the backend, so pieces are kept verbatim:
/// no trimming and no dropping of empty entries.
pub fn parse_text_ids(input: &str) -> Vec<String> {
    input.split(',').map(str::to_string).collect()
}

/// Blank folder input means "no destination folder".
pub fn normalize_folder_id(input: &str) -> Option<String> {
    if input.trim().is_empty() {
        None
    } else {
        Some(input.to_string())
    }
}

// ============================================================================
// Controller
// ============================================================================

/// Holds the in-flight flag for one import.
///
/// Dropping it, including when the import future is dropped mid-flight,
/// clears `importing` and frees the controller for the next import.
struct ImportGuard<'a> {
    in_flight: &'a AtomicBool,
    state: &'a StateStore,
}

impl<'a> ImportGuard<'a> {
    fn acquire(in_flight: &'a AtomicBool, state: &'a StateStore) -> Option<Self> {
        in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { in_flight, state })
    }
}

impl Drop for ImportGuard<'_> {
    fn drop(&mut self) {
        self.state.update(|s| s.importing = false);
        self.in_flight.store(false, Ordering::Release);
    }
}

pub struct TransferController {
    backend: Arc<GoogleDriveBackend>,
    state: StateStore,
    messages: Messages,
    event_bus: Option<EventBus>,
    import_in_flight: AtomicBool,
}

impl TransferController {
    pub fn new(backend: Arc<GoogleDriveBackend>, state: StateStore, messages: Messages) -> Self {
        Self {
            backend,
            state,
            messages,
            event_bus: None,
            import_in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Whether an import is currently running on this controller.
    pub fn is_importing(&self) -> bool {
        self.import_in_flight.load(Ordering::Acquire)
    }

    /// Import every file of `folder_id` into the backend.
    ///
    /// # Errors
    ///
    /// - [`TransferError::ImportInProgress`] if another import is running;
    ///   state is left untouched.
    /// - [`TransferError::Backend`] for transport, status or decode failures;
    ///   the state then carries a localized error message.
    #[instrument(skip(self))]
    pub async fn import_folder(&self, folder_id: &str) -> Result<ImportResult> {
        let _guard = ImportGuard::acquire(&self.import_in_flight, &self.state)
            .ok_or(TransferError::ImportInProgress)?;

        let attempt_id = ImportAttemptId::new();
        let importing = self.messages.importing();
        self.state.update(|s| {
            s.importing = true;
            s.message = Some(StatusMessage::info(importing));
            s.import_status = None;
        });
        self.emit(TransferEvent::ImportStarted {
            attempt_id: attempt_id.as_str(),
            folder_id: folder_id.to_string(),
        });
        info!(%attempt_id, "Import started");

        match self.backend.import_folder(folder_id).await {
            Ok(result) => {
                let imported = result.imported_count();
                let skipped = result.skipped_count();
                let message = if result.is_partial() {
                    StatusMessage::warning(self.messages.import_partial(imported, skipped))
                } else {
                    StatusMessage::success(self.messages.import_succeeded(imported))
                };

                let status = result.clone();
                self.state.update(|s| {
                    s.importing = false;
                    s.message = Some(message);
                    s.import_status = Some(status);
                });
                self.emit(TransferEvent::ImportCompleted {
                    attempt_id: attempt_id.as_str(),
                    imported,
                    skipped,
                });
                info!(%attempt_id, imported, skipped, "Import completed");
                Ok(result)
            }
            Err(e) => {
                let error = TransferError::from(e);
                let text = self.messages.import_failed(&error.to_string());
                self.state.update(|s| {
                    s.importing = false;
                    s.message = Some(StatusMessage::error(text));
                });
                self.emit(TransferEvent::ImportFailed {
                    attempt_id: attempt_id.as_str(),
                    message: error.to_string(),
                    status: error.status(),
                });
                warn!(%attempt_id, error = %error, "Import failed");
                Err(error)
            }
        }
    }

    /// Export documents to Drive, optionally into `folder_id`.
    ///
    /// On success the backend's own message is shown to the user.
    #[instrument(skip(self, text_ids), fields(documents = text_ids.len()))]
    pub async fn export_to_drive(
        &self,
        text_ids: Vec<String>,
        folder_id: Option<String>,
    ) -> Result<ExportResult> {
        let document_count = text_ids.len();
        let request = ExportRequest {
            text_ids,
            folder_id,
        };

        match self.backend.export_documents(&request).await {
            Ok(result) => {
                let text = result.message.clone();
                self.state
                    .update(|s| s.message = Some(StatusMessage::success(text)));
                self.emit(TransferEvent::ExportCompleted {
                    document_count,
                    message: result.message.clone(),
                });
                info!(document_count, "Export completed");
                Ok(result)
            }
            Err(e) => {
                let error = TransferError::from(e);
                let text = self.messages.export_failed(&error.to_string());
                self.state
                    .update(|s| s.message = Some(StatusMessage::error(text)));
                self.emit(TransferEvent::ExportFailed {
                    message: error.to_string(),
                    status: error.status(),
                });
                warn!(error = %error, "Export failed");
                Err(error)
            }
        }
    }

    fn emit(&self, event: TransferEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Transfer(event)).ok();
        }
    }
}
