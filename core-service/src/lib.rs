//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (HTTP, settings,
//! navigation) into the authorization and transfer controllers and exposes
//! them as one [`DriveImportService`]. Desktop apps typically enable the
//! `desktop-shims` feature, which fills in reqwest, SQLite and system-browser
//! bridges for anything not injected.
//!
//! The page lifecycle maps onto two entry points: [`begin_authorization`]
//! leaves for the provider's consent page, and [`handle_page_load`] runs when
//! the app is shown again, possibly on the callback URL.
//!
//! [`begin_authorization`]: DriveImportService::begin_authorization
//! [`handle_page_load`]: DriveImportService::handle_page_load

pub mod error;

pub use error::{CoreError, Result};

pub use core_auth::CallbackOutcome;
pub use core_runtime::config::{ClientConfig, CoreConfig};
#[cfg(feature = "desktop-shims")]
pub use core_runtime::config::SystemBrowser;
pub use core_runtime::state::{StatusKind, StatusMessage, ViewState};
pub use core_transfer::{normalize_folder_id, parse_text_ids};
pub use provider_google_drive::{ExportResult, Folder, ImportResult, SkippedFile};

use std::sync::Arc;

use bridge_traits::navigation::BrowserNavigator;
use core_auth::{AuthError, AuthorizationInitiator, CallbackHandler, ConsumedCodeLedger};
use core_runtime::events::{EventBus, EventStream};
use core_runtime::messages::Messages;
use core_runtime::state::StateStore;
use core_transfer::TransferController;
use provider_google_drive::GoogleDriveBackend;
use tokio::sync::watch;
use tracing::info;
use url::Url;

/// Primary façade exposed to host applications.
pub struct DriveImportService {
    client: ClientConfig,
    navigator: Arc<dyn BrowserNavigator>,
    #[cfg(feature = "desktop-shims")]
    desktop_browser: Option<Arc<SystemBrowser>>,
    state: StateStore,
    event_bus: EventBus,
    ledger: ConsumedCodeLedger,
    initiator: AuthorizationInitiator,
    callback: CallbackHandler,
    transfer: TransferController,
}

impl DriveImportService {
    /// Create the service from a fully built configuration.
    pub fn new(config: CoreConfig) -> Result<Self> {
        let CoreConfig {
            client,
            http_client,
            settings_store,
            navigator,
            #[cfg(feature = "desktop-shims")]
            desktop_browser,
            event_bus,
            ..
        } = config;

        let backend = GoogleDriveBackend::new(http_client, &client.base_url)
            .map_err(|e| CoreError::InitializationFailed(e.to_string()))?
            .with_timeout(client.request_timeout());
        let backend = Arc::new(backend);

        let state = StateStore::new();
        let messages = Messages::new(client.locale);
        let ledger = ConsumedCodeLedger::new(settings_store);

        let initiator =
            AuthorizationInitiator::new(client.clone()).with_event_bus(event_bus.clone());
        let callback = CallbackHandler::new(
            Arc::clone(&backend),
            ledger.clone(),
            state.clone(),
            messages,
            client.redirect_path.clone(),
        )
        .with_event_bus(event_bus.clone());
        let transfer = TransferController::new(backend, state.clone(), messages)
            .with_event_bus(event_bus.clone());

        info!(base_url = %client.base_url, locale = client.locale.tag(), "Drive import service ready");

        Ok(Self {
            client,
            navigator,
            #[cfg(feature = "desktop-shims")]
            desktop_browser,
            state,
            event_bus,
            ledger,
            initiator,
            callback,
            transfer,
        })
    }

    pub fn client_config(&self) -> &ClientConfig {
        &self.client
    }

    /// The default desktop navigator, when no navigator was injected.
    ///
    /// A desktop host that receives the provider redirect records it here
    /// with [`SystemBrowser::set_current_url`], then calls
    /// [`handle_page_load`](Self::handle_page_load).
    #[cfg(feature = "desktop-shims")]
    pub fn desktop_browser(&self) -> Option<&Arc<SystemBrowser>> {
        self.desktop_browser.as_ref()
    }

    /// Navigate to the provider's consent page.
    pub async fn begin_authorization(&self) -> Result<Url> {
        Ok(self
            .initiator
            .begin_authorization(self.navigator.as_ref())
            .await?)
    }

    /// Consent URL for the navigator's current origin, without navigating.
    pub fn authorization_url(&self) -> Result<Url> {
        Ok(self.initiator.authorization_url(&self.navigator.origin())?)
    }

    /// Run the callback check against the page currently shown.
    pub async fn handle_page_load(&self) -> Result<CallbackOutcome> {
        Ok(self
            .callback
            .handle_page_load(self.navigator.as_ref())
            .await?)
    }

    /// Run the callback check against an explicit URL.
    pub async fn handle_callback_url(&self, url: &str) -> Result<CallbackOutcome> {
        Ok(self.callback.handle_callback_url(url).await?)
    }

    pub async fn import_folder(&self, folder_id: &str) -> Result<ImportResult> {
        Ok(self.transfer.import_folder(folder_id).await?)
    }

    pub async fn export_to_drive(
        &self,
        text_ids: Vec<String>,
        folder_id: Option<String>,
    ) -> Result<ExportResult> {
        Ok(self.transfer.export_to_drive(text_ids, folder_id).await?)
    }

    /// Export using raw form input: a comma-separated id list and an
    /// optional destination folder (blank means none).
    pub async fn export_from_form(
        &self,
        text_ids_input: &str,
        folder_id_input: &str,
    ) -> Result<ExportResult> {
        self.export_to_drive(
            parse_text_ids(text_ids_input),
            normalize_folder_id(folder_id_input),
        )
        .await
    }

    /// Forget every authorization code recorded as exchanged.
    pub async fn clear_consumed_codes(&self) -> Result<usize> {
        self.ledger
            .clear()
            .await
            .map_err(|e| CoreError::Auth(AuthError::Ledger(e)))
    }

    /// Current view state.
    pub fn state(&self) -> ViewState {
        self.state.snapshot()
    }

    /// Receiver notified after every state change.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Stream of auth and transfer events.
    pub fn events(&self) -> EventStream {
        EventStream::new(self.event_bus.subscribe())
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}

/// Convenience bootstrapper for desktop hosts.
///
/// Missing bridges are filled in with the desktop defaults.
///
/// ```no_run
/// # async fn example(redirect: &str) -> core_service::Result<()> {
/// use core_service::{bootstrap_desktop, ClientConfig};
///
/// let service = bootstrap_desktop(ClientConfig::new("client-id.apps.googleusercontent.com")).await?;
/// service.begin_authorization().await?;
///
/// // Later, once the host's listener receives the provider redirect:
/// if let Some(browser) = service.desktop_browser() {
///     browser.set_current_url(redirect);
/// }
/// service.handle_page_load().await?;
/// # Ok(())
/// # }
/// ```
#[cfg(feature = "desktop-shims")]
pub async fn bootstrap_desktop(client: ClientConfig) -> Result<DriveImportService> {
    let config = CoreConfig::builder().client(client).build().await?;
    DriveImportService::new(config)
}
