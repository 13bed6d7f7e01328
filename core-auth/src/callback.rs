//! OAuth callback handling.
//!
//! When the provider redirects back, the page URL carries `?code=...`. The
//! [`CallbackHandler`] hands the code to the backend, which establishes a
//! session, and then loads the user's folders.
//!
//! ## Exactly-once exchange
//!
//! The handler may run several times for the same URL (re-renders, reloads,
//! concurrent tasks). Before any network call it checks, under a lock:
//!
//! 1. the session is not already established, and
//! 2. the code has not been claimed in the [`ConsumedCodeLedger`].
//!
//! A claimed code stays claimed even if the exchange later fails; the
//! provider rejects reused codes anyway.
//!
//! ## Failure
//!
//! Any failure during exchange or listing leaves the state unauthenticated
//! with no folders and an error message for the user.

use bridge_traits::navigation::BrowserNavigator;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::messages::Messages;
use core_runtime::state::{StateStore, StatusMessage};
use provider_google_drive::GoogleDriveBackend;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};
use url::Url;

use crate::error::{AuthError, Result};
use crate::ledger::ConsumedCodeLedger;
use crate::oauth::redirect_uri_for;

/// What a callback invocation did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallbackOutcome {
    /// The URL carried no authorization code. Nothing happened.
    NoCode,
    /// A session already exists. No call was made.
    AlreadyAuthenticated,
    /// The code was exchanged before. No call was made.
    CodeAlreadyConsumed,
    /// Exchange and folder listing both succeeded.
    Authenticated { folder_count: usize },
}

pub struct CallbackHandler {
    backend: Arc<GoogleDriveBackend>,
    ledger: ConsumedCodeLedger,
    state: StateStore,
    messages: Messages,
    redirect_path: String,
    event_bus: Option<EventBus>,
    claim_lock: Mutex<()>,
}

impl CallbackHandler {
    pub fn new(
        backend: Arc<GoogleDriveBackend>,
        ledger: ConsumedCodeLedger,
        state: StateStore,
        messages: Messages,
        redirect_path: impl Into<String>,
    ) -> Self {
        Self {
            backend,
            ledger,
            state,
            messages,
            redirect_path: redirect_path.into(),
            event_bus: None,
            claim_lock: Mutex::new(()),
        }
    }

    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Inspect the page the navigator is currently showing.
    pub async fn handle_page_load(
        &self,
        navigator: &dyn BrowserNavigator,
    ) -> Result<CallbackOutcome> {
        self.handle_callback_url(&navigator.current_url()).await
    }

    /// Process a callback URL such as `http://localhost:5173/callback?code=ABC`.
    ///
    /// The redirect URI sent to the backend is rebuilt from the URL's own
    /// origin, so it matches the one used when authorization started.
    #[instrument(skip(self, url))]
    pub async fn handle_callback_url(&self, url: &str) -> Result<CallbackOutcome> {
        let parsed =
            Url::parse(url).map_err(|e| AuthError::InvalidUrl(format!("{}: {}", url, e)))?;

        let code = match parsed
            .query_pairs()
            .find(|(key, _)| key == "code")
            .map(|(_, value)| value.into_owned())
        {
            Some(code) if !code.is_empty() => code,
            _ => return Ok(CallbackOutcome::NoCode),
        };

        let redirect_uri = redirect_uri_for(
            &parsed.origin().ascii_serialization(),
            &self.redirect_path,
        );

        {
            let _guard = self.claim_lock.lock().await;

            if self.state.snapshot().authenticated {
                info!("Session already established; ignoring callback");
                return Ok(CallbackOutcome::AlreadyAuthenticated);
            }

            match self.ledger.claim(&code).await {
                Ok(true) => {}
                Ok(false) => {
                    warn!("Authorization code already consumed; not exchanging again");
                    self.emit(AuthEvent::CodeReplayRejected);
                    return Ok(CallbackOutcome::CodeAlreadyConsumed);
                }
                Err(e) => return Err(self.fail(AuthError::Ledger(e))),
            }
        }

        match self.establish_session(&code, &redirect_uri).await {
            Ok(folder_count) => Ok(CallbackOutcome::Authenticated { folder_count }),
            Err(e) => Err(self.fail(e)),
        }
    }

    async fn establish_session(&self, code: &str, redirect_uri: &str) -> Result<usize> {
        self.backend
            .exchange_code(code, redirect_uri)
            .await
            .map_err(AuthError::AuthExchangeFailed)?;

        self.state.update(|s| s.authenticated = true);
        self.emit(AuthEvent::SessionEstablished);
        info!("Session established");

        let folders = self
            .backend
            .list_folders()
            .await
            .map_err(AuthError::FolderListingFailed)?;

        let count = folders.len();
        self.state.update(|s| s.folders = folders);
        self.emit(AuthEvent::FoldersLoaded { count });
        info!(count, "Folders loaded");

        Ok(count)
    }

    fn fail(&self, error: AuthError) -> AuthError {
        warn!(error = %error, "Authentication failed");

        let text = self.messages.folders_failed(&error.to_string());
        self.state.update(|s| {
            s.authenticated = false;
            s.folders.clear();
            s.message = Some(StatusMessage::error(text));
        });
        self.emit(AuthEvent::AuthFailed {
            message: error.to_string(),
            status: error.status(),
        });

        error
    }

    fn emit(&self, event: AuthEvent) {
        if let Some(bus) = &self.event_bus {
            bus.emit(CoreEvent::Auth(event)).ok();
        }
    }
}
