//! # Authentication Module
//!
//! Client half of the OAuth 2.0 authorization-code flow against Google Drive.
//!
//! ## Overview
//!
//! - [`AuthorizationInitiator`] builds the consent URL and navigates to it.
//! - [`CallbackHandler`] picks the code off the callback URL, has the
//!   backend exchange it, then loads the folder list.
//! - [`ConsumedCodeLedger`] guarantees a code is exchanged at most once.
//!
//! Tokens never reach this crate. The backend keeps them behind a session
//! cookie.

pub mod callback;
pub mod error;
pub mod ledger;
pub mod oauth;

pub use callback::{CallbackHandler, CallbackOutcome};
pub use error::{AuthError, Result};
pub use ledger::ConsumedCodeLedger;
pub use oauth::AuthorizationInitiator;
