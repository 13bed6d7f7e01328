//! Browser navigation using the system browser

use async_trait::async_trait;
use bridge_traits::{
    error::{BridgeError, Result},
    navigation::BrowserNavigator,
};
use std::sync::RwLock;
use tracing::{debug, info};

/// Desktop [`BrowserNavigator`] backed by the system browser.
///
/// A desktop host has no page of its own, so the origin is whatever address
/// the host's callback listener is reachable at. When the provider redirects
/// back, the host records the received URL with [`SystemBrowser::set_current_url`]
/// before running the callback handler.
pub struct SystemBrowser {
    origin: String,
    current_url: RwLock<String>,
}

impl SystemBrowser {
    pub fn new(origin: impl Into<String>) -> Self {
        let origin = origin.into().trim_end_matches('/').to_string();
        let current_url = RwLock::new(format!("{}/", origin));
        Self {
            origin,
            current_url,
        }
    }

    /// Record the URL the host is currently showing (typically the callback
    /// URL with its `code` query parameter).
    pub fn set_current_url(&self, url: impl Into<String>) {
        let url = url.into();
        match self.current_url.write() {
            Ok(mut guard) => *guard = url,
            Err(poisoned) => *poisoned.into_inner() = url,
        }
    }
}

#[async_trait]
impl BrowserNavigator for SystemBrowser {
    fn origin(&self) -> String {
        self.origin.clone()
    }

    fn current_url(&self) -> String {
        match self.current_url.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    async fn navigate(&self, url: &str) -> Result<()> {
        debug!("Opening system browser");
        let target = url.to_string();

        tokio::task::spawn_blocking(move || webbrowser::open(&target))
            .await
            .map_err(|e| BridgeError::OperationFailed(format!("Browser task failed: {}", e)))?
            .map_err(|e| {
                BridgeError::OperationFailed(format!("Failed to open browser: {}", e))
            })?;

        info!("Opened authorization page in system browser");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_has_no_trailing_slash() {
        let browser = SystemBrowser::new("http://localhost:5173/");
        assert_eq!(browser.origin(), "http://localhost:5173");
        assert_eq!(browser.current_url(), "http://localhost:5173/");
    }

    #[test]
    fn test_set_current_url() {
        let browser = SystemBrowser::new("http://localhost:5173");
        browser.set_current_url("http://localhost:5173/callback?code=abc");
        assert_eq!(
            browser.current_url(),
            "http://localhost:5173/callback?code=abc"
        );
    }
}
