//! # Transfer Module
//!
//! Moves documents between Google Drive and the processing backend.
//!
//! [`TransferController`] runs folder imports (one at a time) and document
//! exports, and reflects each outcome into the shared view state as a
//! localized [`StatusMessage`](core_runtime::state::StatusMessage).
//!
//! An import can partially succeed: the backend reports both processed and
//! skipped files, and the controller surfaces the skipped ones as a warning.

pub mod controller;
pub mod error;

pub use controller::{normalize_folder_id, parse_text_ids, ImportAttemptId, TransferController};
pub use error::{Result, TransferError};
