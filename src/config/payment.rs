//! Payment gateway configuration.

use serde::{Deserialize, Serialize};

/// Razorpay-style payment gateway settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PaymentConfig {
    pub base_url: String,
    pub key_id: String,
    /// Shared secret for order auth and callback signatures; normally
    /// supplied via `TOLLGATE_PAYMENT_KEY_SECRET`.
    #[serde(skip_serializing)]
    pub key_secret: String,
    /// Premium upgrade price in the currency's minor unit.
    pub amount_minor: u64,
    pub currency: String,
    /// Credits granted on a verified premium upgrade.
    pub premium_credits: u32,
}

impl Default for PaymentConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.razorpay.com".to_string(),
            key_id: String::new(),
            key_secret: String::new(),
            amount_minor: 49_900,
            currency: "INR".to_string(),
            premium_credits: 1000,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_payment_defaults() {
        let config = PaymentConfig::default();
        assert_eq!(config.amount_minor, 49_900);
        assert_eq!(config.currency, "INR");
        assert_eq!(config.premium_credits, 1000);
    }
}
