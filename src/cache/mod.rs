//! Cache-aside layer.
//!
//! A process-local TTL map holding short-lived copies of API-key records
//! and dashboard aggregates. Entries are derived, disposable, and
//! reconstructable from the store at any time - never a source of truth.
//! There is no eviction beyond TTL expiry and no write-through guarantee:
//! cache and store may diverge until an entry expires.

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::{Duration, Instant};

struct CacheEntry {
    payload: serde_json::Value,
    expires_at: Instant,
}

/// TTL key/value cache with lazy expiry.
///
/// Expired entries are dropped on the read path; [`TtlCache::purge_expired`]
/// exists for the background sweeper so idle entries don't pile up.
#[derive(Default)]
pub struct TtlCache {
    entries: DashMap<String, CacheEntry>,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch an unexpired entry, removing it if the TTL has lapsed.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let expired = match self.entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                return serde_json::from_value(entry.payload.clone()).ok();
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            self.entries.remove(key);
        }
        None
    }

    /// Store a value under the given TTL, replacing any previous entry.
    pub fn put<T: Serialize>(&self, key: impl Into<String>, value: &T, ttl: Duration) {
        let payload = match serde_json::to_value(value) {
            Ok(payload) => payload,
            Err(e) => {
                // A cache miss is always safe; skip rather than fail the request.
                tracing::warn!(error = %e, "failed to serialize cache payload");
                return;
            }
        };
        self.entries.insert(
            key.into(),
            CacheEntry {
                payload,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    /// Drop an entry, if present.
    pub fn remove(&self, key: &str) {
        self.entries.remove(key);
    }

    /// Drop every expired entry.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.entries.retain(|_, entry| entry.expires_at > now);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Cache key for an API-key record.
pub fn api_key_cache_key(api_key: &str) -> String {
    format!("apikey:{}", api_key)
}

/// Cache key for a user's dashboard aggregates.
pub fn dashboard_cache_key(owner_id: &str) -> String {
    format!("dashboard:{}", owner_id)
}

/// Cache key for a generated image, keyed by prompt.
pub fn image_cache_key(prompt: &str) -> String {
    format!("image:{}", prompt)
}
