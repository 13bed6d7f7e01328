//! Authorization request construction.
//!
//! Builds the provider consent URL for the authorization-code flow and sends
//! the browser there. The client id is public; no secret or token is ever
//! handled on this side. The backend performs the code exchange.

use bridge_traits::navigation::BrowserNavigator;
use core_runtime::config::ClientConfig;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use tracing::{debug, info, instrument};
use url::Url;

use crate::error::{AuthError, Result};

/// Starts the OAuth authorization-code flow.
#[derive(Debug, Clone)]
pub struct AuthorizationInitiator {
    config: ClientConfig,
    event_bus: Option<EventBus>,
}

impl AuthorizationInitiator {
    pub fn new(config: ClientConfig) -> Self {
        Self {
            config,
            event_bus: None,
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Redirect URI registered with the provider: `origin` followed by the
    /// callback path.
    pub fn redirect_uri(&self, origin: &str) -> String {
        redirect_uri_for(origin, &self.config.redirect_path)
    }

    /// Build the consent URL for the page served from `origin`.
    ///
    /// Each parameter appears exactly once and is URL-encoded.
    ///
    /// # Example
    ///
    /// ```
    /// use core_auth::AuthorizationInitiator;
    /// use core_runtime::config::ClientConfig;
    ///
    /// let initiator = AuthorizationInitiator::new(ClientConfig::new("client-123"));
    /// let url = initiator.authorization_url("http://localhost:5173").unwrap();
    /// assert!(url.as_str().contains("response_type=code"));
    /// ```
    #[instrument(skip(self))]
    pub fn authorization_url(&self, origin: &str) -> Result<Url> {
        let mut url = Url::parse(&self.config.auth_endpoint).map_err(|e| {
            AuthError::InvalidUrl(format!("{}: {}", self.config.auth_endpoint, e))
        })?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.redirect_uri(origin))
            .append_pair("scope", &self.config.scope)
            .append_pair("response_type", "code")
            .append_pair("access_type", "offline");

        debug!("Built authorization URL");
        Ok(url)
    }

    /// Send the browser to the consent page.
    ///
    /// Safe to call repeatedly; every call navigates again.
    #[instrument(skip(self, navigator))]
    pub async fn begin_authorization(&self, navigator: &dyn BrowserNavigator) -> Result<Url> {
        let origin = navigator.origin();
        let url = self.authorization_url(&origin)?;

        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Auth(AuthEvent::AuthorizationStarted {
                redirect_uri: self.redirect_uri(&origin),
            }))
            .ok();
        }

        navigator
            .navigate(url.as_str())
            .await
            .map_err(AuthError::Navigation)?;

        info!("Navigated to provider consent page");
        Ok(url)
    }
}

pub(crate) fn redirect_uri_for(origin: &str, redirect_path: &str) -> String {
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        redirect_path.trim_start_matches('/')
    )
}
