//! Console-wide error taxonomy.
//!
//! Every handler failure funnels into [`ConsoleError`]; the API layer maps
//! it onto the single JSON error envelope. All failures are terminal for
//! the request - nothing is retried.

use crate::auth::AuthError;
use crate::genai::GenAiError;
use crate::media::MediaError;
use crate::payment::PaymentError;
use crate::store::StoreError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsoleError {
    /// The bearer token matches no key record (403).
    #[error("API key not found")]
    KeyNotFound,

    /// The key has no credits left, or was already disabled (403).
    /// Reaching zero also flips the key's status to disabled.
    #[error("trial credits exhausted; this API key has been disabled")]
    CreditsExhausted,

    /// The ledger store failed (500).
    #[error("database error: {0}")]
    Database(#[from] StoreError),

    /// An upstream collaborator (model, media host, payment gateway,
    /// identity provider) failed (500, opaque to the caller).
    #[error("upstream failure: {0}")]
    Upstream(String),

    /// The upstream answered but the expected payload field was missing (500).
    #[error("upstream returned no {0}")]
    EmptyResult(&'static str),

    /// No valid session cookie on a session-bound route (401).
    #[error("not signed in")]
    Unauthenticated,

    /// Missing or malformed request parameters (400).
    #[error("{0}")]
    BadRequest(String),

    /// `create-order` fails closed for premium accounts (409).
    #[error("account is already on the premium plan")]
    AlreadyPremium,

    /// At most one API key per owner (409).
    #[error("an API key already exists for this account")]
    KeyExists,
}

impl From<GenAiError> for ConsoleError {
    fn from(err: GenAiError) -> Self {
        match err {
            GenAiError::EmptyResult(what) => ConsoleError::EmptyResult(what),
            other => ConsoleError::Upstream(other.to_string()),
        }
    }
}

impl From<MediaError> for ConsoleError {
    fn from(err: MediaError) -> Self {
        ConsoleError::Upstream(err.to_string())
    }
}

impl From<PaymentError> for ConsoleError {
    fn from(err: PaymentError) -> Self {
        ConsoleError::Upstream(err.to_string())
    }
}

impl From<AuthError> for ConsoleError {
    fn from(err: AuthError) -> Self {
        ConsoleError::Upstream(err.to_string())
    }
}
