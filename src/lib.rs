//! Workspace placeholder crate.
//!
//! This crate exists to expose the feature flags that map to the individual
//! workspace crates. Host applications can depend on `drive-import-workspace`
//! and enable `desktop-shims` to get the fully wired [`DriveImportService`]
//! without naming each crate.

#[cfg(feature = "desktop-shims")]
pub use core_service::{CoreError, DriveImportService};
