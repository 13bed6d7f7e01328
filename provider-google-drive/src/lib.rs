//! # Google Drive Import Backend
//!
//! Typed client for the document-processing backend's Google Drive endpoints.
//!
//! ## Overview
//!
//! This module provides:
//! - Authorization code exchange (the backend keeps the resulting session)
//! - Folder listing
//! - Folder import with partial-failure reporting
//! - Document export back to Drive
//!
//! The client never sees a token. Every call is sent with credentials
//! included and the host's transport carries the session cookie.
//!
//! Non-success statuses are turned into [`GoogleDriveError::RequestFailed`]
//! before any body decoding happens. No call is retried.

pub mod connector;
pub mod error;
pub mod types;

pub use connector::{extract_error_message, GoogleDriveBackend};
pub use error::{GoogleDriveError, Result};
pub use types::{
    AuthExchangeRequest, ExportRequest, ExportResult, Folder, ImportRequest, ImportResult,
    ProcessedFile, SkippedFile,
};
