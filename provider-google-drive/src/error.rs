//! Error types for the Google Drive import backend client

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Backend client errors
#[derive(Error, Debug)]
pub enum GoogleDriveError {
    /// The request never produced an HTTP response (connection, TLS, timeout)
    #[error("Network error: {0}")]
    Transport(String),

    /// The backend answered with a non-success status
    #[error("{message} (status {status})")]
    RequestFailed { status: u16, message: String },

    /// Success status but the body does not have the expected shape
    #[error("Failed to parse backend response: {0}")]
    ParseError(String),

    /// Base URL could not be used to build endpoint URLs
    #[error("Invalid backend URL: {0}")]
    InvalidUrl(String),

    /// Bridge error while preparing a request
    #[error(transparent)]
    Bridge(#[from] BridgeError),
}

impl GoogleDriveError {
    /// HTTP status of a `RequestFailed` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            GoogleDriveError::RequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type for backend operations
pub type Result<T> = std::result::Result<T, GoogleDriveError>;

impl From<GoogleDriveError> for BridgeError {
    fn from(error: GoogleDriveError) -> Self {
        match error {
            GoogleDriveError::Bridge(e) => e,
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}
