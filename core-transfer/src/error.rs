use provider_google_drive::GoogleDriveError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TransferError {
    #[error("An import is already in progress")]
    ImportInProgress,

    #[error(transparent)]
    Backend(#[from] GoogleDriveError),
}

impl TransferError {
    pub fn status(&self) -> Option<u16> {
        match self {
            TransferError::Backend(e) => e.status(),
            TransferError::ImportInProgress => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, TransferError>;
