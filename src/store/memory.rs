//! In-memory ledger store for tests and standalone runs.

use super::error::StoreError;
use super::types::{ApiKeyRecord, KeyStatus, Plan, PromptHistoryEntry, TransactionEntry, UserRecord};
use super::LedgerStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

#[derive(Default)]
struct Tables {
    keys: HashMap<String, ApiKeyRecord>,
    history: Vec<PromptHistoryEntry>,
    transactions: Vec<TransactionEntry>,
    users: HashMap<String, UserRecord>,
}

/// Ledger store backed by process memory.
///
/// A single mutex guards all tables; `consume_credit` is naturally atomic
/// under it. State does not survive a restart.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a key record directly. Test/bootstrap helper.
    pub fn seed_key(&self, record: ApiKeyRecord) {
        self.tables
            .lock()
            .expect("ledger mutex poisoned")
            .keys
            .insert(record.key.clone(), record);
    }

    /// Overwrite a key's credit balance, bypassing the consume path.
    /// Test helper for staleness scenarios.
    pub fn set_credits(&self, key: &str, credits: u32) {
        let mut tables = self.tables.lock().expect("ledger mutex poisoned");
        if let Some(record) = tables.keys.get_mut(key) {
            record.credits = credits;
        }
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn find_key(&self, key: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        let tables = self.tables.lock().expect("ledger mutex poisoned");
        Ok(tables.keys.get(key).cloned())
    }

    async fn find_key_by_owner(&self, owner_id: &str) -> Result<Option<ApiKeyRecord>, StoreError> {
        let tables = self.tables.lock().expect("ledger mutex poisoned");
        Ok(tables.keys.values().find(|r| r.owner_id == owner_id).cloned())
    }

    async fn insert_key(&self, record: ApiKeyRecord) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("ledger mutex poisoned");
        tables.keys.insert(record.key.clone(), record);
        Ok(())
    }

    async fn disable_key(&self, key: &str) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("ledger mutex poisoned");
        if let Some(record) = tables.keys.get_mut(key) {
            record.status = KeyStatus::Disabled;
        }
        Ok(())
    }

    async fn consume_credit(&self, key: &str) -> Result<Option<u32>, StoreError> {
        let mut tables = self.tables.lock().expect("ledger mutex poisoned");
        match tables.keys.get_mut(key) {
            Some(record) if record.credits > 0 => {
                record.credits -= 1;
                Ok(Some(record.credits))
            }
            _ => Ok(None),
        }
    }

    async fn upgrade_plan(&self, owner_id: &str, credits: u32) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("ledger mutex poisoned");
        for record in tables.keys.values_mut() {
            if record.owner_id == owner_id {
                record.credits = credits;
                record.plan = Plan::Premium;
                record.status = KeyStatus::Enabled;
            }
        }
        Ok(())
    }

    async fn append_history(&self, entry: PromptHistoryEntry) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("ledger mutex poisoned");
        tables.history.push(entry);
        Ok(())
    }

    async fn history_for_key(&self, key: &str) -> Result<Vec<PromptHistoryEntry>, StoreError> {
        let tables = self.tables.lock().expect("ledger mutex poisoned");
        Ok(tables
            .history
            .iter()
            .filter(|e| e.key == key)
            .cloned()
            .collect())
    }

    async fn append_transaction(&self, entry: TransactionEntry) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().expect("ledger mutex poisoned");
        tables.transactions.push(entry);
        Ok(())
    }

    async fn transactions_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<TransactionEntry>, StoreError> {
        let tables = self.tables.lock().expect("ledger mutex poisoned");
        Ok(tables
            .transactions
            .iter()
            .filter(|e| e.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn transaction_exists(&self, transaction_id: &str) -> Result<bool, StoreError> {
        let tables = self.tables.lock().expect("ledger mutex poisoned");
        Ok(tables
            .transactions
            .iter()
            .any(|e| e.transaction_id == transaction_id))
    }

    async fn find_user(&self, owner_id: &str) -> Result<Option<UserRecord>, StoreError> {
        let tables = self.tables.lock().expect("ledger mutex poisoned");
        Ok(tables.users.get(owner_id).cloned())
    }

    async fn upsert_user(&self, user: UserRecord) -> Result<UserRecord, StoreError> {
        let mut tables = self.tables.lock().expect("ledger mutex poisoned");
        let row = tables
            .users
            .entry(user.owner_id.clone())
            .or_insert(user)
            .clone();
        Ok(row)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_consume_credit_stops_at_zero() {
        let store = MemoryStore::new();
        store.seed_key(ApiKeyRecord::new_trial("o1", "k1", 2));

        assert_eq!(store.consume_credit("k1").await.unwrap(), Some(1));
        assert_eq!(store.consume_credit("k1").await.unwrap(), Some(0));
        // Balance is zero now; further consumes must refuse, not wrap.
        assert_eq!(store.consume_credit("k1").await.unwrap(), None);
        assert_eq!(store.find_key("k1").await.unwrap().unwrap().credits, 0);
    }

    #[tokio::test]
    async fn test_consume_credit_unknown_key() {
        let store = MemoryStore::new();
        assert_eq!(store.consume_credit("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_disable_key_is_idempotent() {
        let store = MemoryStore::new();
        store.seed_key(ApiKeyRecord::new_trial("o1", "k1", 0));
        store.disable_key("k1").await.unwrap();
        store.disable_key("k1").await.unwrap();
        assert_eq!(
            store.find_key("k1").await.unwrap().unwrap().status,
            KeyStatus::Disabled
        );
    }

    #[tokio::test]
    async fn test_upgrade_plan_sets_premium() {
        let store = MemoryStore::new();
        store.seed_key(ApiKeyRecord::new_trial("o1", "k1", 0));
        store.upgrade_plan("o1", 1000).await.unwrap();

        let record = store.find_key("k1").await.unwrap().unwrap();
        assert_eq!(record.credits, 1000);
        assert_eq!(record.plan, Plan::Premium);
        assert_eq!(record.status, KeyStatus::Enabled);
    }

    #[tokio::test]
    async fn test_upsert_user_keeps_first_row() {
        let store = MemoryStore::new();
        let first = UserRecord {
            owner_id: "o1".into(),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            picture: None,
        };
        store.upsert_user(first.clone()).await.unwrap();

        let second = UserRecord {
            name: "Renamed".into(),
            ..first.clone()
        };
        let kept = store.upsert_user(second).await.unwrap();
        assert_eq!(kept, first);
    }
}
