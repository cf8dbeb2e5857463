//! Credit ledger store abstraction.
//!
//! The authoritative state - API key records, prompt history, transaction
//! history, and user rows - lives in an external relational store. This
//! module defines the [`LedgerStore`] trait the rest of the service is
//! written against, plus two implementations:
//!
//! - [`RestStore`]: PostgREST-style HTTP client (the production path)
//! - [`MemoryStore`]: in-process store for tests and standalone runs
//!
//! The credit decrement is deliberately a single store-side operation
//! ([`LedgerStore::consume_credit`]) rather than a read followed by a
//! write, so concurrent requests against the last remaining credit cannot
//! both pass.

pub mod error;
pub mod memory;
pub mod rest;
pub mod types;

pub use error::StoreError;
pub use memory::MemoryStore;
pub use rest::RestStore;
pub use types::{ApiKeyRecord, KeyStatus, Plan, PromptHistoryEntry, TransactionEntry, UserRecord};

use async_trait::async_trait;

/// Unified interface over the relational credit ledger.
///
/// Object-safe; handlers hold it as `Arc<dyn LedgerStore>`.
#[async_trait]
pub trait LedgerStore: Send + Sync + 'static {
    /// Look up an API key record by its opaque token.
    async fn find_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, StoreError>;

    /// Look up the key issued to an owner, if any.
    async fn find_key_by_owner(&self, owner_id: &str) -> Result<Option<ApiKeyRecord>, StoreError>;

    /// Insert a freshly issued key record.
    async fn insert_key(&self, record: ApiKeyRecord) -> Result<(), StoreError>;

    /// Flip a key's status to disabled. Idempotent.
    async fn disable_key(&self, key: &str) -> Result<(), StoreError>;

    /// Atomic decrement-if-positive on a key's credit balance.
    ///
    /// Returns `Ok(Some(remaining))` when a credit was consumed and
    /// `Ok(None)` when the balance was already zero (or the key is
    /// unknown). Never drives `credits` below zero.
    async fn consume_credit(&self, key: &str) -> Result<Option<u32>, StoreError>;

    /// Premium upgrade: set the owner's key to the given balance,
    /// `plan = premium`, `status = enabled`.
    async fn upgrade_plan(&self, owner_id: &str, credits: u32) -> Result<(), StoreError>;

    /// Append one prompt-history row.
    async fn append_history(&self, entry: PromptHistoryEntry) -> Result<(), StoreError>;

    /// All history rows recorded against a key, oldest first.
    async fn history_for_key(&self, key: &str) -> Result<Vec<PromptHistoryEntry>, StoreError>;

    /// Append one transaction row.
    async fn append_transaction(&self, entry: TransactionEntry) -> Result<(), StoreError>;

    /// All transaction rows for an owner, oldest first.
    async fn transactions_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<TransactionEntry>, StoreError>;

    /// Whether a transaction row already exists for this payment id.
    /// Guards the premium upgrade against replayed callbacks.
    async fn transaction_exists(&self, transaction_id: &str) -> Result<bool, StoreError>;

    /// Look up a user row by the provider's profile id.
    async fn find_user(&self, owner_id: &str) -> Result<Option<UserRecord>, StoreError>;

    /// Insert the user on first sight, otherwise return the existing row.
    async fn upsert_user(&self, user: UserRecord) -> Result<UserRecord, StoreError>;
}
