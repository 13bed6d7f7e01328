//! Integration tests for the OAuth callback flow
//!
//! These tests drive the callback handler against a mocked backend and a real
//! in-memory settings store:
//! - Exchange then folder listing on a fresh code
//! - No calls once a session exists
//! - No calls for a code that was already exchanged, even after a state reset
//! - Rollback to unauthenticated on exchange or listing failure
//! - Concurrent callbacks with the same code

use async_trait::async_trait;
use bridge_desktop::SqliteSettingsStore;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bridge_traits::navigation::BrowserNavigator;
use bridge_traits::storage::SettingsStore;
use bytes::Bytes;
use core_auth::{AuthError, CallbackHandler, CallbackOutcome, ConsumedCodeLedger};
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::messages::{Locale, Messages};
use core_runtime::state::{StateStore, StatusKind};
use mockall::mock;
use provider_google_drive::GoogleDriveBackend;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

const CALLBACK_URL: &str = "http://localhost:5173/callback?code=ABC123&scope=drive.readonly";
const AUTH_URL: &str = "http://localhost:8000/google/auth";
const FOLDERS_URL: &str = "http://localhost:8000/google/folders";

// ============================================================================
// Fixtures
// ============================================================================

mock! {
    HttpClient {}

    #[async_trait]
    impl HttpClient for HttpClient {
        async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
    }
}

fn response(status: u16, body: &str) -> BridgeResult<HttpResponse> {
    Ok(HttpResponse {
        status,
        headers: HashMap::new(),
        body: Bytes::from(body.to_string()),
    })
}

fn body_json(request: &HttpRequest) -> Value {
    serde_json::from_slice(request.body.as_ref().unwrap()).unwrap()
}

async fn settings() -> Arc<dyn SettingsStore> {
    Arc::new(SqliteSettingsStore::in_memory().await.unwrap())
}

fn handler(
    http: MockHttpClient,
    settings: Arc<dyn SettingsStore>,
    state: StateStore,
    locale: Locale,
) -> CallbackHandler {
    let backend = Arc::new(GoogleDriveBackend::new(Arc::new(http), "http://localhost:8000").unwrap());
    CallbackHandler::new(
        backend,
        ConsumedCodeLedger::new(settings),
        state,
        Messages::new(locale),
        "/callback",
    )
}

fn expect_exchange(http: &mut MockHttpClient, status: u16, body: &'static str) {
    http.expect_execute()
        .withf(|req| {
            req.method == HttpMethod::Post
                && req.url == AUTH_URL
                && body_json(req)
                    == json!({ "code": "ABC123", "redirect_uri": "http://localhost:5173/callback" })
        })
        .times(1)
        .returning(move |_| response(status, body));
}

fn expect_folders(http: &mut MockHttpClient, status: u16, body: &'static str) {
    http.expect_execute()
        .withf(|req| req.method == HttpMethod::Get && req.url == FOLDERS_URL)
        .times(1)
        .returning(move |_| response(status, body));
}

struct CallbackPage;

#[async_trait]
impl BrowserNavigator for CallbackPage {
    fn origin(&self) -> String {
        "http://localhost:5173".to_string()
    }

    fn current_url(&self) -> String {
        CALLBACK_URL.to_string()
    }

    async fn navigate(&self, _url: &str) -> BridgeResult<()> {
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn test_fresh_code_exchanges_then_lists_folders() {
    let mut http = MockHttpClient::new();
    expect_exchange(&mut http, 200, "{}");
    expect_folders(
        &mut http,
        200,
        r#"[{"id": "f1", "name": "Reports"}, {"id": "f2", "name": "Scans"}]"#,
    );

    let bus = EventBus::new(16);
    let mut events = bus.subscribe();
    let state = StateStore::new();
    let handler = handler(http, settings().await, state.clone(), Locale::English).with_event_bus(bus);

    let outcome = handler.handle_page_load(&CallbackPage).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::Authenticated { folder_count: 2 });

    let snapshot = state.snapshot();
    assert!(snapshot.authenticated);
    assert_eq!(snapshot.folders.len(), 2);
    assert_eq!(snapshot.folders[0].name, "Reports");
    assert!(snapshot.message.is_none());

    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Auth(AuthEvent::SessionEstablished)
    );
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Auth(AuthEvent::FoldersLoaded { count: 2 })
    );
}

#[tokio::test]
async fn test_no_code_is_a_no_op() {
    let http = MockHttpClient::new();
    let state = StateStore::new();
    let handler = handler(http, settings().await, state.clone(), Locale::English);

    for url in [
        "http://localhost:5173/",
        "http://localhost:5173/callback",
        "http://localhost:5173/callback?code=",
        "http://localhost:5173/callback?error=access_denied",
    ] {
        assert_eq!(
            handler.handle_callback_url(url).await.unwrap(),
            CallbackOutcome::NoCode
        );
    }
    assert!(!state.snapshot().authenticated);
}

#[tokio::test]
async fn test_second_invocation_after_success_makes_no_calls() {
    let mut http = MockHttpClient::new();
    expect_exchange(&mut http, 200, "{}");
    expect_folders(&mut http, 200, "[]");

    let handler = handler(http, settings().await, StateStore::new(), Locale::English);

    handler.handle_callback_url(CALLBACK_URL).await.unwrap();
    let second = handler.handle_callback_url(CALLBACK_URL).await.unwrap();

    assert_eq!(second, CallbackOutcome::AlreadyAuthenticated);
}

#[tokio::test]
async fn test_replayed_code_is_rejected_after_state_reset() {
    let settings = settings().await;

    let mut http = MockHttpClient::new();
    expect_exchange(&mut http, 200, "{}");
    expect_folders(&mut http, 200, "[]");
    handler(http, settings.clone(), StateStore::new(), Locale::English)
        .handle_callback_url(CALLBACK_URL)
        .await
        .unwrap();

    // Fresh view state, same persisted ledger. The mock has no expectations,
    // so any request would panic.
    let bus = EventBus::new(4);
    let mut events = bus.subscribe();
    let state = StateStore::new();
    let replay = handler(MockHttpClient::new(), settings, state.clone(), Locale::English)
        .with_event_bus(bus);

    let outcome = replay.handle_callback_url(CALLBACK_URL).await.unwrap();
    assert_eq!(outcome, CallbackOutcome::CodeAlreadyConsumed);
    assert!(!state.snapshot().authenticated);
    assert_eq!(
        events.recv().await.unwrap(),
        CoreEvent::Auth(AuthEvent::CodeReplayRejected)
    );
}

#[tokio::test]
async fn test_exchange_failure_skips_listing() {
    let mut http = MockHttpClient::new();
    expect_exchange(&mut http, 400, r#"{"detail": "invalid_grant"}"#);

    let bus = EventBus::new(4);
    let mut events = bus.subscribe();
    let state = StateStore::new();
    let handler = handler(http, settings().await, state.clone(), Locale::English).with_event_bus(bus);

    let err = handler.handle_callback_url(CALLBACK_URL).await.unwrap_err();
    assert!(matches!(err, AuthError::AuthExchangeFailed(_)));
    assert_eq!(err.status(), Some(400));

    let snapshot = state.snapshot();
    assert!(!snapshot.authenticated);
    assert!(snapshot.folders.is_empty());
    let message = snapshot.message.unwrap();
    assert_eq!(message.kind, StatusKind::Error);
    assert!(message.text.starts_with("Error loading folders: "));
    assert!(message.text.contains("invalid_grant"));

    match events.recv().await.unwrap() {
        CoreEvent::Auth(AuthEvent::AuthFailed { status, .. }) => assert_eq!(status, Some(400)),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn test_listing_failure_rolls_back_authentication() {
    let mut http = MockHttpClient::new();
    expect_exchange(&mut http, 200, "{}");
    expect_folders(&mut http, 500, "upstream unavailable");

    let state = StateStore::new();
    let mut observer = state.subscribe();
    let handler = handler(http, settings().await, state.clone(), Locale::PortugueseBrazil);

    let err = handler.handle_callback_url(CALLBACK_URL).await.unwrap_err();
    assert!(matches!(err, AuthError::FolderListingFailed(_)));

    let snapshot = state.snapshot();
    assert!(!snapshot.authenticated);
    assert!(snapshot.folders.is_empty());
    let message = snapshot.message.unwrap();
    assert!(message.text.starts_with("Erro ao carregar pastas: "));
    assert!(message.text.contains("upstream unavailable"));

    assert!(observer.has_changed().unwrap());
    assert!(!observer.borrow_and_update().authenticated);
}

#[tokio::test]
async fn test_failed_code_stays_consumed() {
    let settings = settings().await;

    let mut http = MockHttpClient::new();
    expect_exchange(&mut http, 400, "{}");
    handler(http, settings.clone(), StateStore::new(), Locale::English)
        .handle_callback_url(CALLBACK_URL)
        .await
        .unwrap_err();

    let outcome = handler(MockHttpClient::new(), settings, StateStore::new(), Locale::English)
        .handle_callback_url(CALLBACK_URL)
        .await
        .unwrap();
    assert_eq!(outcome, CallbackOutcome::CodeAlreadyConsumed);
}

#[tokio::test]
async fn test_concurrent_callbacks_exchange_once() {
    let mut http = MockHttpClient::new();
    expect_exchange(&mut http, 200, "{}");
    expect_folders(&mut http, 200, r#"[{"id": "f1", "name": "Reports"}]"#);

    let handler = Arc::new(handler(http, settings().await, StateStore::new(), Locale::English));

    let tasks: Vec<_> = (0..6)
        .map(|_| {
            let handler = handler.clone();
            tokio::spawn(async move { handler.handle_callback_url(CALLBACK_URL).await })
        })
        .collect();

    let mut authenticated = 0;
    for task in tasks {
        match task.await.unwrap().unwrap() {
            CallbackOutcome::Authenticated { folder_count } => {
                assert_eq!(folder_count, 1);
                authenticated += 1;
            }
            CallbackOutcome::AlreadyAuthenticated | CallbackOutcome::CodeAlreadyConsumed => {}
            CallbackOutcome::NoCode => panic!("code not detected"),
        }
    }
    assert_eq!(authenticated, 1);
}

#[tokio::test]
async fn test_invalid_callback_url() {
    let handler = handler(MockHttpClient::new(), settings().await, StateStore::new(), Locale::English);
    let result = handler.handle_callback_url("::not a url::").await;
    assert!(matches!(result, Err(AuthError::InvalidUrl(_))));
}
