//! # Observable View State
//!
//! The controllers never talk to a UI. They mutate a single [`ViewState`]
//! held in a [`StateStore`]; hosts render from snapshots or watch for changes.
//!
//! ## Lifecycle of one import attempt
//!
//! ```text
//! Idle ──import_folder──> Importing ──┬──> Success (message Success/Warning)
//!                                     └──> Failed  (message Error)
//!        <────────────── importing = false ────────┘
//! ```
//!
//! Mutations go through [`StateStore::update`], a short synchronous critical
//! section. Never hold a [`StateStore::snapshot`] across an `.await` expecting
//! it to stay current.

use crate::models::{Folder, ImportResult, SkippedFile};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::watch;

/// How a status message should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatusKind {
    Info,
    Success,
    Warning,
    Error,
}

/// Text shown to the user together with its kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    pub fn new(kind: StatusKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Info, text)
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Success, text)
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Warning, text)
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::new(StatusKind::Error, text)
    }
}

/// Everything a view needs to render the import panel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    /// A backend session was established during this page load.
    pub authenticated: bool,
    /// An import request is in flight.
    pub importing: bool,
    pub message: Option<StatusMessage>,
    pub folders: Vec<Folder>,
    /// Result of the last successful import.
    pub import_status: Option<ImportResult>,
}

impl ViewState {
    /// The connect button is shown until a session exists and at least one
    /// folder was listed.
    pub fn needs_authorization(&self) -> bool {
        !self.authenticated || self.folders.is_empty()
    }

    pub fn skipped_files(&self) -> &[SkippedFile] {
        self.import_status
            .as_ref()
            .map(|status| status.skipped_files.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_error(&self) -> bool {
        matches!(
            self.message,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        )
    }
}

/// Shared, observable holder of the [`ViewState`].
///
/// Cloning yields another handle to the same state.
#[derive(Clone)]
pub struct StateStore {
    sender: Arc<watch::Sender<ViewState>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::with_state(ViewState::default())
    }

    pub fn with_state(state: ViewState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ViewState {
        self.sender.borrow().clone()
    }

    /// Receiver notified after every [`update`](Self::update).
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.sender.subscribe()
    }

    /// Mutate the state in place and notify observers.
    pub fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut ViewState),
    {
        self.sender.send_modify(f);
    }
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StateStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &*self.sender.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ProcessedFile;

    #[test]
    fn test_needs_authorization() {
        let mut state = ViewState::default();
        assert!(state.needs_authorization());

        state.authenticated = true;
        assert!(state.needs_authorization());

        state.folders.push(Folder::new("f1", "Reports"));
        assert!(!state.needs_authorization());
    }

    #[test]
    fn test_skipped_files_and_error_predicates() {
        let mut state = ViewState::default();
        assert!(state.skipped_files().is_empty());
        assert!(!state.is_error());

        state.import_status = Some(ImportResult {
            processes: vec![ProcessedFile(serde_json::json!({}))],
            skipped_files: vec![SkippedFile::new("x.pdf")],
            message: String::new(),
        });
        state.message = Some(StatusMessage::error("Import error: boom"));

        assert_eq!(state.skipped_files()[0].filename, "x.pdf");
        assert!(state.is_error());
    }

    #[tokio::test]
    async fn test_update_notifies_subscribers() {
        let store = StateStore::new();
        let mut rx = store.subscribe();

        store.update(|state| state.importing = true);

        rx.changed().await.unwrap();
        assert!(rx.borrow().importing);
        assert!(store.snapshot().importing);
    }

    #[test]
    fn test_clones_share_state() {
        let store = StateStore::new();
        let other = store.clone();
        other.update(|state| state.authenticated = true);
        assert!(store.snapshot().authenticated);
    }
}
