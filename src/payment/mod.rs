//! Payment gateway client and callback verification.
//!
//! Order creation and payment lookup go to a Razorpay-style gateway over
//! basic auth. Callback verification is the one piece of security-relevant
//! logic in the console: an HMAC-SHA256 digest of `order_id|payment_id`
//! under the shared gateway secret, compared against the caller-supplied
//! hex signature.

use crate::config::PaymentConfig;
use crate::signing::hmac_sha256_hex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur talking to the payment gateway.
#[derive(Error, Debug)]
pub enum PaymentError {
    /// Network connectivity error.
    #[error("payment gateway network error: {0}")]
    Network(String),

    /// The gateway rejected the request (4xx, 5xx).
    #[error("payment gateway error {status}: {message}")]
    Upstream { status: u16, message: String },

    /// Response body doesn't match the expected shape.
    #[error("invalid payment gateway response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for PaymentError {
    fn from(err: reqwest::Error) -> Self {
        PaymentError::Network(err.to_string())
    }
}

/// A created gateway order.
#[derive(Debug, Clone, Deserialize)]
pub struct Order {
    pub id: String,
    pub amount: u64,
    pub currency: String,
}

/// A fetched gateway payment. `notes` echoes what was attached at order
/// creation and carries the owner the upgrade applies to.
#[derive(Debug, Clone, Deserialize)]
pub struct Payment {
    pub id: String,
    pub status: String,
    #[serde(default)]
    pub notes: PaymentNotes,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PaymentNotes {
    #[serde(default)]
    pub owner_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Client for the payment gateway's order and payment endpoints.
pub struct PaymentGateway {
    base_url: String,
    key_id: String,
    key_secret: String,
    amount_minor: u64,
    currency: String,
    client: Arc<Client>,
}

impl PaymentGateway {
    pub fn new(config: &PaymentConfig, client: Arc<Client>) -> Self {
        Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            amount_minor: config.amount_minor,
            currency: config.currency.clone(),
            client,
        }
    }

    /// Public key id, exposed to the checkout page.
    pub fn key_id(&self) -> &str {
        &self.key_id
    }

    /// Create an order for the configured premium amount, tagging it with
    /// the owner so the verified callback can find the account to upgrade.
    pub async fn create_order(
        &self,
        owner_id: &str,
        email: Option<&str>,
    ) -> Result<Order, PaymentError> {
        let receipt = format!("receipt_{}", Uuid::new_v4());
        let body = json!({
            "amount": self.amount_minor,
            "currency": self.currency,
            "receipt": receipt,
            "notes": PaymentNotes {
                owner_id: owner_id.to_string(),
                email: email.map(str::to_string),
            },
        });

        let response = self
            .client
            .post(format!("{}/v1/orders", self.base_url))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .json(&body)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }

    /// Fetch a payment by id to resolve its status and owner notes.
    pub async fn fetch_payment(&self, payment_id: &str) -> Result<Payment, PaymentError> {
        let response = self
            .client
            .get(format!("{}/v1/payments/{}", self.base_url, payment_id))
            .basic_auth(&self.key_id, Some(&self.key_secret))
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(PaymentError::Upstream {
                status: status.as_u16(),
                message,
            });
        }
        response
            .json()
            .await
            .map_err(|e| PaymentError::InvalidResponse(e.to_string()))
    }

    /// Recompute the callback signature and compare it to the supplied one.
    ///
    /// The digest covers `order_id|payment_id` under the gateway key
    /// secret, hex encoded.
    pub fn verify_signature(&self, order_id: &str, payment_id: &str, signature: &str) -> bool {
        let expected = hmac_sha256_hex(
            self.key_secret.as_bytes(),
            &format!("{}|{}", order_id, payment_id),
        );
        expected == signature.to_lowercase()
    }
}
