//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! This crate provides implementations of the bridge traits using
//! desktop-appropriate libraries:
//! - `HttpClient` using `reqwest`, with a cookie jar for credentialed requests
//! - `SettingsStore` using SQLite-backed key-value store
//! - `BrowserNavigator` using the system browser via `webbrowser`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ReqwestHttpClient, SqliteSettingsStore, SystemBrowser};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let settings = SqliteSettingsStore::new("settings.db".into()).await?;
//!     let browser = SystemBrowser::new("http://localhost:5173");
//!
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```

mod browser;
mod http;
mod settings;

pub use browser::SystemBrowser;
pub use http::ReqwestHttpClient;
pub use settings::SqliteSettingsStore;
