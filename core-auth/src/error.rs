use bridge_traits::error::BridgeError;
use provider_google_drive::GoogleDriveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authorization code exchange failed: {0}")]
    AuthExchangeFailed(#[source] GoogleDriveError),

    #[error("Folder listing failed: {0}")]
    FolderListingFailed(#[source] GoogleDriveError),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Navigation failed: {0}")]
    Navigation(#[source] BridgeError),

    #[error("Consumed-code ledger unavailable: {0}")]
    Ledger(#[source] BridgeError),
}

impl AuthError {
    /// HTTP status returned by the backend, if the failure came from one.
    pub fn status(&self) -> Option<u16> {
        match self {
            AuthError::AuthExchangeFailed(e) | AuthError::FolderListingFailed(e) => e.status(),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, AuthError>;
