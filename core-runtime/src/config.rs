//! # Core Configuration Module
//!
//! Provides configuration management for the import controller.
//!
//! ## Overview
//!
//! Two layers:
//! - [`ClientConfig`] holds the plain settings (backend base URL, OAuth client
//!   id, redirect path, scope, locale, timeout). It is `Deserialize`, so hosts
//!   can load it from JSON.
//! - [`CoreConfig`] bundles a validated `ClientConfig` with the host bridges.
//!   It is built through [`CoreConfigBuilder`], which fails fast with an
//!   actionable message when a bridge is missing.
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - backend calls (desktop default: reqwest with cookie jar)
//! - `SettingsStore` - consumed-code ledger (desktop default: SQLite)
//! - `BrowserNavigator` - origin, current URL, navigation (desktop default:
//!   system browser)
//!
//! When the `desktop-shims` feature is enabled, desktop defaults are injected
//! for any bridge that was not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::{ClientConfig, CoreConfig};
//!
//! let config = CoreConfig::builder()
//!     .client(ClientConfig::new("1234.apps.googleusercontent.com"))
//!     .settings_path("/tmp/drive-import/settings.db")
//!     .build()
//!     .await?;
//! ```
//!
//! The OAuth client identifier is public. `ClientConfig` deliberately has no
//! field for a client secret.

use crate::error::{Error, Result};
use crate::events::EventBus;
use crate::messages::Locale;
use bridge_traits::{BrowserNavigator, HttpClient, SettingsStore};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop::SystemBrowser;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const DEFAULT_REDIRECT_PATH: &str = "/callback";
pub const DEFAULT_AUTH_ENDPOINT: &str = "https://accounts.google.com/o/oauth2/v2/auth";
pub const DEFAULT_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
/// Origin used by the desktop navigator when the host does not set one.
pub const DEFAULT_APP_ORIGIN: &str = "http://localhost:5173";

const MAX_REQUEST_TIMEOUT_SECS: u64 = 600;

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_redirect_path() -> String {
    DEFAULT_REDIRECT_PATH.to_string()
}

fn default_auth_endpoint() -> String {
    DEFAULT_AUTH_ENDPOINT.to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

/// Settings for talking to the backend and the authorization server.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClientConfig {
    /// Backend API base URL, without trailing slash.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Public OAuth client identifier.
    pub client_id: String,

    /// Path appended to the page origin to form the redirect URI.
    #[serde(default = "default_redirect_path")]
    pub redirect_path: String,

    #[serde(default = "default_auth_endpoint")]
    pub auth_endpoint: String,

    #[serde(default = "default_scope")]
    pub scope: String,

    #[serde(default)]
    pub locale: Locale,

    /// Per-request transport timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl ClientConfig {
    /// Config with every default applied.
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            base_url: default_base_url(),
            client_id: client_id.into(),
            redirect_path: default_redirect_path(),
            auth_endpoint: default_auth_endpoint(),
            scope: default_scope(),
            locale: Locale::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }

    /// Parse from JSON, then validate.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| Error::Config(format!("Invalid client configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_redirect_path(mut self, path: impl Into<String>) -> Self {
        self.redirect_path = path.into();
        self
    }

    pub fn with_auth_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.auth_endpoint = endpoint.into();
        self
    }

    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    /// Sub-second remainders round up to the next whole second.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout_secs = timeout.as_secs() + u64::from(timeout.subsec_nanos() > 0);
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Base URL and authorization endpoint are absolute http(s) URLs
    /// - Client id is not empty
    /// - Redirect path starts with `/`
    /// - Timeout is between 1 and 600 seconds
    pub fn validate(&self) -> Result<()> {
        validate_http_url("Base URL", &self.base_url)?;
        validate_http_url("Authorization endpoint", &self.auth_endpoint)?;

        if self.client_id.trim().is_empty() {
            return Err(Error::Config(
                "OAuth client id cannot be empty. Set it from your provider's console."
                    .to_string(),
            ));
        }

        if !self.redirect_path.starts_with('/') {
            return Err(Error::Config(format!(
                "Redirect path must start with '/', got '{}'",
                self.redirect_path
            )));
        }

        if self.request_timeout_secs == 0 {
            return Err(Error::Config(
                "Request timeout must be greater than 0 seconds".to_string(),
            ));
        }

        if self.request_timeout_secs > MAX_REQUEST_TIMEOUT_SECS {
            return Err(Error::Config(format!(
                "Request timeout exceeds maximum of {} seconds",
                MAX_REQUEST_TIMEOUT_SECS
            )));
        }

        Ok(())
    }
}

fn validate_http_url(label: &str, value: &str) -> Result<()> {
    let url = Url::parse(value)
        .map_err(|e| Error::Config(format!("{} '{}' is not a valid URL: {}", label, value, e)))?;

    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::Config(format!(
            "{} must use http or https, got '{}'",
            label, other
        ))),
    }
}

/// Validated settings plus the host bridges.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    pub client: ClientConfig,

    /// Transport for backend calls
    pub http_client: Arc<dyn HttpClient>,

    /// Backing store for the consumed-code ledger
    pub settings_store: Arc<dyn SettingsStore>,

    /// Current location and top-level navigation
    pub navigator: Arc<dyn BrowserNavigator>,

    /// Concrete handle to `navigator` when the desktop default was used.
    ///
    /// The host feeds the callback URL through
    /// [`SystemBrowser::set_current_url`].
    #[cfg(feature = "desktop-shims")]
    pub desktop_browser: Option<Arc<SystemBrowser>>,

    pub event_bus: EventBus,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("client", &self.client)
            .field("http_client", &"HttpClient { ... }")
            .field("settings_store", &"SettingsStore { ... }")
            .field("navigator", &"BrowserNavigator { ... }")
            .field("event_bus", &self.event_bus)
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for backend calls. \
                 Desktop: enable the 'desktop-shims' feature to use ReqwestHttpClient. \
                 Web: inject a fetch-based client that honours credentials: 'include'."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn settings_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SettingsStore".to_string(),
        message: "SettingsStore implementation is required to remember consumed \
                 authorization codes. \
                 Desktop: enable the 'desktop-shims' feature to use SqliteSettingsStore. \
                 Web: inject a sessionStorage-based settings store."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn navigator_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "BrowserNavigator".to_string(),
        message: "BrowserNavigator implementation is required to start authorization \
                 and read the callback URL. \
                 Desktop: enable the 'desktop-shims' feature to use SystemBrowser. \
                 Web: inject a window.location-based navigator."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(client: &ClientConfig) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let http = ReqwestHttpClient::with_timeout(client.request_timeout())
        .map_err(|e| Error::Internal(format!("Failed to initialize default HttpClient: {}", e)))?;
    Ok(Arc::new(http))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_client: &ClientConfig) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

/// Default settings database location for desktop hosts.
#[cfg(feature = "desktop-shims")]
pub fn default_settings_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("drive-import")
        .join("settings.db")
}

#[cfg(feature = "desktop-shims")]
async fn provide_default_settings_store(
    settings_path: Option<PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    use bridge_desktop::SqliteSettingsStore;

    let path = settings_path.unwrap_or_else(default_settings_path);
    let store = SqliteSettingsStore::new(path).await.map_err(|e| {
        Error::Internal(format!("Failed to initialize default SettingsStore: {}", e))
    })?;
    Ok(Arc::new(store))
}

#[cfg(not(feature = "desktop-shims"))]
async fn provide_default_settings_store(
    _settings_path: Option<PathBuf>,
) -> Result<Arc<dyn SettingsStore>> {
    Err(settings_store_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_navigator(origin: Option<String>) -> Arc<SystemBrowser> {
    let origin = origin.unwrap_or_else(|| DEFAULT_APP_ORIGIN.to_string());
    Arc::new(SystemBrowser::new(origin))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_navigator(_origin: Option<String>) -> Result<Arc<dyn BrowserNavigator>> {
    Err(navigator_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    client: Option<ClientConfig>,
    http_client: Option<Arc<dyn HttpClient>>,
    settings_store: Option<Arc<dyn SettingsStore>>,
    navigator: Option<Arc<dyn BrowserNavigator>>,
    event_bus: Option<EventBus>,
    settings_path: Option<PathBuf>,
    app_origin: Option<String>,
}

impl CoreConfigBuilder {
    /// Sets the client configuration (required).
    pub fn client(mut self, client: ClientConfig) -> Self {
        self.client = Some(client);
        self
    }

    /// Sets the HTTP client implementation.
    ///
    /// The client must keep credentials (cookies) between requests sent with
    /// `CredentialsMode::Include`.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the settings store implementation.
    pub fn settings_store(mut self, store: Arc<dyn SettingsStore>) -> Self {
        self.settings_store = Some(store);
        self
    }

    /// Sets the navigator implementation.
    pub fn navigator(mut self, navigator: Arc<dyn BrowserNavigator>) -> Self {
        self.navigator = Some(navigator);
        self
    }

    /// Shares an existing event bus instead of creating a new one.
    pub fn event_bus(mut self, bus: EventBus) -> Self {
        self.event_bus = Some(bus);
        self
    }

    /// Location of the default SQLite settings database.
    ///
    /// Ignored when a settings store is injected.
    pub fn settings_path<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.settings_path = Some(path.into());
        self
    }

    /// Origin the default desktop navigator reports.
    ///
    /// Ignored when a navigator is injected.
    pub fn app_origin(mut self, origin: impl Into<String>) -> Self {
        self.app_origin = Some(origin.into());
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `Config` if the client configuration is missing or invalid
    /// - `CapabilityMissing` if a bridge is missing and no desktop default is
    ///   available
    /// - `Internal` if a desktop default fails to initialize
    pub async fn build(self) -> Result<CoreConfig> {
        let client = self.client.ok_or_else(|| {
            Error::Config(
                "Client configuration is required. Use .client(ClientConfig::new(..)) to set it."
                    .to_string(),
            )
        })?;
        client.validate()?;

        let http_client = match self.http_client {
            Some(http) => http,
            None => provide_default_http_client(&client)?,
        };

        let settings_store = match self.settings_store {
            Some(store) => store,
            None => provide_default_settings_store(self.settings_path).await?,
        };

        #[cfg(feature = "desktop-shims")]
        let (navigator, desktop_browser) = match self.navigator {
            Some(navigator) => (navigator, None),
            None => {
                let browser = provide_default_navigator(self.app_origin);
                (Arc::clone(&browser) as Arc<dyn BrowserNavigator>, Some(browser))
            }
        };

        #[cfg(not(feature = "desktop-shims"))]
        let navigator = match self.navigator {
            Some(navigator) => navigator,
            None => provide_default_navigator(self.app_origin)?,
        };

        Ok(CoreConfig {
            client,
            http_client,
            settings_store,
            navigator,
            #[cfg(feature = "desktop-shims")]
            desktop_browser,
            event_bus: self.event_bus.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::{BridgeError, HttpRequest, HttpResponse};

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(
            &self,
            _request: HttpRequest,
        ) -> std::result::Result<HttpResponse, BridgeError> {
            Err(BridgeError::NotAvailable("offline".to_string()))
        }
    }

    struct MockSettingsStore;

    #[async_trait]
    impl SettingsStore for MockSettingsStore {
        async fn set_string(&self, _key: &str, _value: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_string(&self, _key: &str) -> std::result::Result<Option<String>, BridgeError> {
            Ok(None)
        }

        async fn set_bool(&self, _key: &str, _value: bool) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn get_bool(&self, _key: &str) -> std::result::Result<Option<bool>, BridgeError> {
            Ok(None)
        }

        async fn insert_if_absent(
            &self,
            _key: &str,
            _value: &str,
        ) -> std::result::Result<bool, BridgeError> {
            Ok(true)
        }

        async fn delete(&self, _key: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }

        async fn has_key(&self, _key: &str) -> std::result::Result<bool, BridgeError> {
            Ok(false)
        }

        async fn list_keys(&self) -> std::result::Result<Vec<String>, BridgeError> {
            Ok(Vec::new())
        }

        async fn clear_all(&self) -> std::result::Result<(), BridgeError> {
            Ok(())
        }
    }

    struct MockNavigator;

    #[async_trait]
    impl BrowserNavigator for MockNavigator {
        fn origin(&self) -> String {
            "http://localhost:5173".to_string()
        }

        fn current_url(&self) -> String {
            "http://localhost:5173/".to_string()
        }

        async fn navigate(&self, _url: &str) -> std::result::Result<(), BridgeError> {
            Ok(())
        }
    }

    fn full_builder() -> CoreConfigBuilder {
        CoreConfig::builder()
            .client(ClientConfig::new("client-123"))
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .navigator(Arc::new(MockNavigator))
    }

    #[test]
    fn test_client_config_defaults() {
        let config = ClientConfig::new("client-123");
        assert_eq!(config.base_url, "http://localhost:8000");
        assert_eq!(config.redirect_path, "/callback");
        assert_eq!(config.scope, DEFAULT_SCOPE);
        assert_eq!(config.locale, Locale::English);
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_client_config_from_json_applies_defaults() {
        let config =
            ClientConfig::from_json(r#"{"client_id": "abc", "locale": "pt-BR"}"#).unwrap();
        assert_eq!(config.client_id, "abc");
        assert_eq!(config.locale, Locale::PortugueseBrazil);
        assert_eq!(config.auth_endpoint, DEFAULT_AUTH_ENDPOINT);
    }

    #[test]
    fn test_client_config_from_json_requires_client_id() {
        let result = ClientConfig::from_json(r#"{"base_url": "http://localhost:8000"}"#);
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let empty_id = ClientConfig::new("  ");
        assert!(empty_id
            .validate()
            .unwrap_err()
            .to_string()
            .contains("client id"));

        let bad_url = ClientConfig::new("id").with_base_url("localhost:8000/api");
        assert!(bad_url.validate().is_err());

        let ftp = ClientConfig::new("id").with_base_url("ftp://files.example.com");
        assert!(ftp.validate().unwrap_err().to_string().contains("http"));

        let bad_path = ClientConfig::new("id").with_redirect_path("callback");
        assert!(bad_path.validate().unwrap_err().to_string().contains("'/'"));

        let zero_timeout = ClientConfig::new("id").with_request_timeout(Duration::ZERO);
        assert!(zero_timeout.validate().is_err());

        let huge_timeout = ClientConfig::new("id").with_request_timeout(Duration::from_secs(3600));
        assert!(huge_timeout
            .validate()
            .unwrap_err()
            .to_string()
            .contains("exceeds maximum"));
    }

    #[test]
    fn test_request_timeout_rounds_up_partial_seconds() {
        let config = ClientConfig::new("id").with_request_timeout(Duration::from_millis(500));
        assert_eq!(config.request_timeout(), Duration::from_secs(1));
        assert!(config.validate().is_ok());

        let config = ClientConfig::new("id").with_request_timeout(Duration::from_millis(1500));
        assert_eq!(config.request_timeout_secs, 2);

        let config = ClientConfig::new("id").with_request_timeout(Duration::from_secs(7));
        assert_eq!(config.request_timeout_secs, 7);
    }

    #[tokio::test]
    async fn test_builder_requires_client_config() {
        let result = CoreConfig::builder()
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .navigator(Arc::new(MockNavigator))
            .build()
            .await;

        assert!(result
            .unwrap_err()
            .to_string()
            .contains("Client configuration is required"));
    }

    #[tokio::test]
    async fn test_builder_validates_client_config() {
        let result = full_builder()
            .client(ClientConfig::new("id").with_redirect_path("nope"))
            .build()
            .await;
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[tokio::test]
    async fn test_builder_with_all_bridges() {
        let bus = EventBus::new(8);
        let _rx = bus.subscribe();

        let config = full_builder().event_bus(bus).build().await.unwrap();

        assert_eq!(config.client.client_id, "client-123");
        assert_eq!(config.navigator.origin(), "http://localhost:5173");
        assert_eq!(config.event_bus.subscriber_count(), 1);
        #[cfg(feature = "desktop-shims")]
        assert!(config.desktop_browser.is_none());
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[tokio::test]
    async fn test_builder_reports_missing_bridges() {
        let result = CoreConfig::builder()
            .client(ClientConfig::new("id"))
            .settings_store(Arc::new(MockSettingsStore))
            .navigator(Arc::new(MockNavigator))
            .build()
            .await;
        match result {
            Err(Error::CapabilityMissing { capability, .. }) => assert_eq!(capability, "HttpClient"),
            other => panic!("expected CapabilityMissing, got {:?}", other.map(|_| ())),
        }

        let result = CoreConfig::builder()
            .client(ClientConfig::new("id"))
            .http_client(Arc::new(MockHttpClient))
            .navigator(Arc::new(MockNavigator))
            .build()
            .await;
        assert!(result.unwrap_err().to_string().contains("SettingsStore"));

        let result = CoreConfig::builder()
            .client(ClientConfig::new("id"))
            .http_client(Arc::new(MockHttpClient))
            .settings_store(Arc::new(MockSettingsStore))
            .build()
            .await;
        assert!(result.unwrap_err().to_string().contains("BrowserNavigator"));
    }

    #[cfg(feature = "desktop-shims")]
    #[tokio::test]
    async fn test_build_with_desktop_defaults() {
        let base = std::env::temp_dir().join(format!("core-runtime-test-{}", uuid::Uuid::new_v4()));

        let config = CoreConfig::builder()
            .client(ClientConfig::new("id"))
            .settings_path(base.join("settings.db"))
            .app_origin("http://127.0.0.1:4000")
            .build()
            .await
            .expect("desktop defaults should succeed");

        assert_eq!(config.navigator.origin(), "http://127.0.0.1:4000");
        let browser = config.desktop_browser.clone().unwrap();
        browser.set_current_url("http://127.0.0.1:4000/callback?code=abc");
        assert_eq!(
            config.navigator.current_url(),
            "http://127.0.0.1:4000/callback?code=abc"
        );
        config
            .settings_store
            .set_string("probe", "ok")
            .await
            .unwrap();
        assert_eq!(
            config.settings_store.get_string("probe").await.unwrap(),
            Some("ok".to_string())
        );

        drop(config);
        let _ = tokio::fs::remove_dir_all(&base).await;
    }
}
