//! Storage Abstractions
//!
//! Provides a platform-agnostic key-value settings store. The core uses it
//! for small persisted markers (such as authorization codes already
//! exchanged); it never holds credentials.

use async_trait::async_trait;

use crate::error::Result;

/// Key-value settings storage trait
///
/// Abstracts platform-specific preferences/settings storage:
/// - Desktop: SQLite file
/// - Web: sessionStorage / localStorage
///
/// # Example
///
/// ```ignore
/// use bridge_traits::storage::SettingsStore;
///
/// async fn remember_locale(store: &dyn SettingsStore) -> Result<()> {
///     store.set_string("locale", "pt-BR").await?;
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Store a string value
    async fn set_string(&self, key: &str, value: &str) -> Result<()>;

    /// Retrieve a string value
    async fn get_string(&self, key: &str) -> Result<Option<String>>;

    /// Store a boolean value
    async fn set_bool(&self, key: &str, value: bool) -> Result<()>;

    /// Retrieve a boolean value
    async fn get_bool(&self, key: &str) -> Result<Option<bool>>;

    /// Store a string value only if the key does not exist yet.
    ///
    /// Returns `true` when the value was written, `false` when the key was
    /// already present. Implementations must perform the check and the write
    /// atomically.
    async fn insert_if_absent(&self, key: &str, value: &str) -> Result<bool>;

    /// Delete a setting
    async fn delete(&self, key: &str) -> Result<()>;

    /// Check if a setting exists
    async fn has_key(&self, key: &str) -> Result<bool>;

    /// List all setting keys
    async fn list_keys(&self) -> Result<Vec<String>>;

    /// Clear all settings
    async fn clear_all(&self) -> Result<()>;
}
