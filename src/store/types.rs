//! Record types for the credit ledger store.

use crate::genai::GenerationKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether an API key may serve generation requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyStatus {
    Enabled,
    Disabled,
}

/// Billing plan attached to an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Plan {
    Trial,
    Premium,
}

/// A metered API key and its credit balance.
///
/// At most one key exists per owner (enforced by an existence check at
/// issue time). Keys are never deleted; exhausted keys are disabled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiKeyRecord {
    pub owner_id: String,
    pub key: String,
    pub credits: u32,
    pub status: KeyStatus,
    pub plan: Plan,
}

impl ApiKeyRecord {
    /// A freshly issued trial key.
    pub fn new_trial(owner_id: impl Into<String>, key: impl Into<String>, credits: u32) -> Self {
        Self {
            owner_id: owner_id.into(),
            key: key.into(),
            credits,
            status: KeyStatus::Enabled,
            plan: Plan::Trial,
        }
    }
}

/// One row per successful generation, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptHistoryEntry {
    pub key: String,
    pub kind: GenerationKind,
    pub prompt: String,
    /// Text output for text generations, hosted media URL otherwise.
    pub response_ref: String,
    pub created_at: DateTime<Utc>,
}

impl PromptHistoryEntry {
    pub fn new(
        key: impl Into<String>,
        kind: GenerationKind,
        prompt: impl Into<String>,
        response_ref: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            kind,
            prompt: prompt.into(),
            response_ref: response_ref.into(),
            created_at: Utc::now(),
        }
    }
}

/// One row per verified payment, append-only.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub transaction_id: String,
    pub owner_id: String,
    pub timestamp: DateTime<Utc>,
    pub status: String,
}

/// An OAuth-provisioned user, keyed by the provider's opaque profile id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub owner_id: String,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
}
