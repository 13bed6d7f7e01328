//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the import controller:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//! - Observable view state and the domain types it carries
//! - Localized user-facing messages
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the auth and transfer
//! crates depend on. It establishes the logging conventions, the event
//! broadcasting mechanism and the single state value the controllers drive.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod messages;
pub mod models;
pub mod state;

pub use error::{Error, Result};
pub use messages::{Locale, Messages};
pub use models::{Folder, ImportResult, ProcessedFile, SkippedFile};
pub use state::{StateStore, StatusKind, StatusMessage, ViewState};
