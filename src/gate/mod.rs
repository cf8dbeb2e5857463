//! Credit gate - the one policy every generation handler goes through.
//!
//! `authorize` resolves the bearer token (cache-aside, then store),
//! rejecting unknown keys and rejecting-and-disabling exhausted ones.
//! `settle` applies the post-call billing: one atomic credit decrement at
//! the store boundary, one history row, and a cache refresh in lockstep.
//! Settlement is not transactional with the generation call itself; a
//! crash between the two under-bills, which is accepted.

use crate::cache::{api_key_cache_key, TtlCache};
use crate::error::ConsoleError;
use crate::genai::GenerationKind;
use crate::store::{ApiKeyRecord, KeyStatus, LedgerStore, PromptHistoryEntry};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

pub struct CreditGate {
    store: Arc<dyn LedgerStore>,
    cache: Arc<TtlCache>,
    key_ttl: Duration,
}

impl CreditGate {
    pub fn new(store: Arc<dyn LedgerStore>, cache: Arc<TtlCache>, key_ttl: Duration) -> Self {
        Self {
            store,
            cache,
            key_ttl,
        }
    }

    /// Resolve an API key and check it may serve a generation request.
    ///
    /// Cache hit short-circuits the store read. A zero balance flips the
    /// key to disabled in the store (best-effort) before rejecting.
    pub async fn authorize(&self, api_key: &str) -> Result<ApiKeyRecord, ConsoleError> {
        let cache_key = api_key_cache_key(api_key);
        let record = match self.cache.get::<ApiKeyRecord>(&cache_key) {
            Some(record) => record,
            None => {
                let record = self
                    .store
                    .find_key(api_key)
                    .await?
                    .ok_or(ConsoleError::KeyNotFound)?;
                self.cache.put(&cache_key, &record, self.key_ttl);
                record
            }
        };

        if record.status == KeyStatus::Disabled {
            return Err(ConsoleError::CreditsExhausted);
        }
        if record.credits == 0 {
            if let Err(e) = self.store.disable_key(api_key).await {
                warn!(error = %e, "failed to disable exhausted key");
            }
            self.cache.remove(&cache_key);
            info!(key = %api_key, "key exhausted and disabled");
            return Err(ConsoleError::CreditsExhausted);
        }
        Ok(record)
    }

    /// Bill a successful generation: consume one credit atomically,
    /// append the history row, and refresh the cached record.
    ///
    /// Returns the remaining balance.
    pub async fn settle(
        &self,
        record: &ApiKeyRecord,
        kind: GenerationKind,
        prompt: &str,
        response_ref: &str,
    ) -> Result<u32, ConsoleError> {
        let remaining = match self.store.consume_credit(&record.key).await? {
            Some(remaining) => remaining,
            None => {
                // Lost the race for the last credit; disable like authorize would.
                if let Err(e) = self.store.disable_key(&record.key).await {
                    warn!(error = %e, "failed to disable exhausted key");
                }
                self.cache.remove(&api_key_cache_key(&record.key));
                return Err(ConsoleError::CreditsExhausted);
            }
        };

        self.store
            .append_history(PromptHistoryEntry::new(
                &record.key,
                kind,
                prompt,
                response_ref,
            ))
            .await?;

        let mut updated = record.clone();
        updated.credits = remaining;
        self.cache
            .put(api_key_cache_key(&record.key), &updated, self.key_ttl);

        info!(key = %record.key, kind = %kind, remaining, "generation settled");
        Ok(remaining)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn gate_with(store: Arc<MemoryStore>) -> CreditGate {
        CreditGate::new(store, Arc::new(TtlCache::new()), Duration::from_secs(3600))
    }

    #[tokio::test]
    async fn test_unknown_key_is_rejected() {
        let store = Arc::new(MemoryStore::new());
        let gate = gate_with(store);
        assert!(matches!(
            gate.authorize("missing").await,
            Err(ConsoleError::KeyNotFound)
        ));
    }

    #[tokio::test]
    async fn test_exhausted_key_is_disabled() {
        let store = Arc::new(MemoryStore::new());
        store.seed_key(ApiKeyRecord::new_trial("o1", "k1", 0));
        let gate = gate_with(Arc::clone(&store));

        assert!(matches!(
            gate.authorize("k1").await,
            Err(ConsoleError::CreditsExhausted)
        ));
        let record = store.find_key("k1").await.unwrap().unwrap();
        assert_eq!(record.status, KeyStatus::Disabled);
    }

    #[tokio::test]
    async fn test_disabled_key_never_serves() {
        let store = Arc::new(MemoryStore::new());
        let mut record = ApiKeyRecord::new_trial("o1", "k1", 3);
        record.status = KeyStatus::Disabled;
        store.seed_key(record);
        let gate = gate_with(store);

        assert!(matches!(
            gate.authorize("k1").await,
            Err(ConsoleError::CreditsExhausted)
        ));
    }

    #[tokio::test]
    async fn test_settle_decrements_once_and_records() {
        let store = Arc::new(MemoryStore::new());
        store.seed_key(ApiKeyRecord::new_trial("o1", "k1", 2));
        let gate = gate_with(Arc::clone(&store));

        let record = gate.authorize("k1").await.unwrap();
        let remaining = gate
            .settle(&record, GenerationKind::Text, "hi", "hello")
            .await
            .unwrap();

        assert_eq!(remaining, 1);
        assert_eq!(store.find_key("k1").await.unwrap().unwrap().credits, 1);
        let history = store.history_for_key("k1").await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].kind, GenerationKind::Text);
        assert_eq!(history[0].response_ref, "hello");
    }

    #[tokio::test]
    async fn test_authorize_uses_cached_record() {
        let store = Arc::new(MemoryStore::new());
        store.seed_key(ApiKeyRecord::new_trial("o1", "k1", 5));
        let gate = gate_with(Arc::clone(&store));

        // Warm the cache, then change the store underneath it.
        gate.authorize("k1").await.unwrap();
        store.set_credits("k1", 1);

        // Cache still answers with the stale balance.
        let record = gate.authorize("k1").await.unwrap();
        assert_eq!(record.credits, 5);
    }

    #[tokio::test]
    async fn test_settle_refreshes_cache() {
        let store = Arc::new(MemoryStore::new());
        store.seed_key(ApiKeyRecord::new_trial("o1", "k1", 2));
        let gate = gate_with(Arc::clone(&store));

        let record = gate.authorize("k1").await.unwrap();
        gate.settle(&record, GenerationKind::Text, "hi", "hello")
            .await
            .unwrap();

        // A subsequent authorize served from cache must see the decrement.
        let cached = gate.authorize("k1").await.unwrap();
        assert_eq!(cached.credits, 1);
    }

    #[tokio::test]
    async fn test_settle_race_loser_gets_exhausted() {
        let store = Arc::new(MemoryStore::new());
        store.seed_key(ApiKeyRecord::new_trial("o1", "k1", 1));
        let gate = gate_with(Arc::clone(&store));

        let record = gate.authorize("k1").await.unwrap();
        // Another request drains the last credit between check and settle.
        store.consume_credit("k1").await.unwrap();

        assert!(matches!(
            gate.settle(&record, GenerationKind::Text, "hi", "hello").await,
            Err(ConsoleError::CreditsExhausted)
        ));
        // No history row for the unbilled call.
        assert!(store.history_for_key("k1").await.unwrap().is_empty());
    }
}
