//! Request and response types for the console API.
//!
//! Every route answers errors with the same JSON envelope:
//!
//! ```json
//! {
//!   "error": {
//!     "message": "API key not found",
//!     "type": "authentication_error",
//!     "code": "key_not_found"
//!   }
//! }
//! ```

use crate::error::ConsoleError;
use crate::genai::GenerationKind;
use crate::store::{ApiKeyRecord, PromptHistoryEntry, TransactionEntry, UserRecord};
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;

/// Query parameters accepted by the generation routes.
#[derive(Debug, Default, Deserialize)]
pub struct GenerateParams {
    pub prompt: Option<String>,
    #[serde(rename = "apiKey")]
    pub api_key: Option<String>,
    /// Explicit modality tag; overrides prompt sniffing on `/genai`.
    pub kind: Option<GenerationKind>,
    // Speaker/voice pairs for multi-speaker TTS prompts.
    pub speaker1: Option<String>,
    pub voice1: Option<String>,
    pub speaker2: Option<String>,
    pub voice2: Option<String>,
}

/// Response for generations whose output lands on the media host.
#[derive(Debug, Serialize, Deserialize)]
pub struct MediaGenerationResponse {
    pub message: String,
    #[serde(rename = "fileUrl")]
    pub file_url: String,
}

/// Response for `GET /generate-api-key`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiKeyIssued {
    pub api_key: String,
    pub credits: u32,
}

/// Response for `POST /create-order`.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateOrderResponse {
    pub order_id: String,
    pub amount: u64,
    pub currency: String,
    /// Public gateway key id for the checkout page.
    pub key_id: String,
}

/// Body of `POST /verify-payment`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPaymentRequest {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

/// Response of `POST /verify-payment`. A signature mismatch is reported
/// here with `success: false`, deliberately not as an HTTP error.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyPaymentResponse {
    pub success: bool,
}

/// Dashboard aggregates; also the shape cached under `dashboard:{owner}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct DashboardView {
    pub user: Option<UserRecord>,
    pub key: Option<ApiKeyRecord>,
    pub history: Vec<PromptHistoryEntry>,
    pub transactions: Vec<TransactionEntry>,
}

/// API error response envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: ApiErrorBody,
}

/// Error details.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
    pub r#type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ApiError {
    fn new(message: &str, r#type: &str, code: &str) -> Self {
        Self {
            error: ApiErrorBody {
                message: message.to_string(),
                r#type: r#type.to_string(),
                code: Some(code.to_string()),
            },
        }
    }

    /// Create a bad request error (400).
    pub fn bad_request(message: &str) -> Self {
        Self::new(message, "invalid_request_error", "invalid_request_error")
    }

    /// Get the HTTP status code for this error.
    fn status_code(&self) -> StatusCode {
        match self.error.code.as_deref() {
            Some("invalid_request_error") => StatusCode::BAD_REQUEST,
            Some("unauthenticated") => StatusCode::UNAUTHORIZED,
            Some("key_not_found") | Some("credits_exhausted") => StatusCode::FORBIDDEN,
            Some("already_premium") | Some("key_exists") => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ConsoleError> for ApiError {
    fn from(err: ConsoleError) -> Self {
        match &err {
            ConsoleError::KeyNotFound => {
                Self::new("API key not found", "authentication_error", "key_not_found")
            }
            ConsoleError::CreditsExhausted => Self::new(
                "You have consumed your credits; this API key has been disabled",
                "authentication_error",
                "credits_exhausted",
            ),
            ConsoleError::Unauthenticated => {
                Self::new("Sign in required", "authentication_error", "unauthenticated")
            }
            ConsoleError::BadRequest(message) => Self::bad_request(message),
            ConsoleError::AlreadyPremium => Self::new(
                "Account is already on the premium plan",
                "invalid_request_error",
                "already_premium",
            ),
            ConsoleError::KeyExists => Self::new(
                "An API key already exists for this account",
                "invalid_request_error",
                "key_exists",
            ),
            // 500-class failures: log the detail, answer with a generic
            // message so upstream internals never leak to the caller.
            ConsoleError::Database(inner) => {
                error!(error = %inner, "store failure");
                Self::new("Database error", "server_error", "database_error")
            }
            ConsoleError::Upstream(detail) => {
                error!(error = %detail, "upstream failure");
                Self::new("Something went wrong", "server_error", "upstream_failure")
            }
            ConsoleError::EmptyResult(what) => {
                error!(missing = what, "upstream returned empty payload");
                Self::new("Something went wrong", "server_error", "empty_result")
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self)).into_response()
    }
}
