//! Error types for generative model calls.

use thiserror::Error;

/// Errors that can occur during a generation call.
#[derive(Error, Debug)]
pub enum GenAiError {
    /// Network connectivity error (DNS, connection refused, etc.).
    #[error("model network error: {0}")]
    Network(String),

    /// The model endpoint returned an error response (4xx, 5xx).
    #[error("model error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The call succeeded but the expected payload field was absent.
    #[error("model returned no {0}")]
    EmptyResult(&'static str),

    /// Response body doesn't match the expected wire shape.
    #[error("invalid model response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for GenAiError {
    fn from(err: reqwest::Error) -> Self {
        GenAiError::Network(err.to_string())
    }
}
