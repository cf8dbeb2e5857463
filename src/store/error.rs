//! Error types for ledger store operations.

use thiserror::Error;

/// Errors that can occur talking to the credit ledger store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("store network error: {0}")]
    Network(String),

    /// The store rejected the request (4xx, 5xx).
    #[error("store error {status}: {message}")]
    Query { status: u16, message: String },

    /// The store response doesn't match the expected row shape.
    #[error("invalid store response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        StoreError::Network(err.to_string())
    }
}
