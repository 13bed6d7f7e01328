//! Browser Navigation Abstraction
//!
//! The authorization flow leaves the page (full navigation to the provider's
//! consent screen) and resumes in a new page load at the callback URL. Hosts
//! expose both halves through [`BrowserNavigator`]:
//! - **Web**: `window.location`
//! - **Desktop**: the system browser plus whatever URL the callback listener
//!   received

use async_trait::async_trait;

use crate::error::Result;

/// Access to the current location and to top-level navigation.
#[async_trait]
pub trait BrowserNavigator: Send + Sync {
    /// Scheme, host and port of the current page, without a trailing slash
    /// (e.g. `http://localhost:5173`).
    fn origin(&self) -> String;

    /// Full URL of the current page, including its query string.
    fn current_url(&self) -> String;

    /// Navigate the top-level browsing context to `url`.
    ///
    /// Control does not come back to the caller's flow on web hosts; the next
    /// thing to run is the callback handler on the redirected page load.
    async fn navigate(&self, url: &str) -> Result<()>;
}
