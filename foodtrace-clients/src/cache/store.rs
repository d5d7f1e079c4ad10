//! In-process cache store with TTL expiry and LRU eviction

use crate::cache::{
    entry::CacheEntry,
    types::{CacheKey, CacheStats, CacheValue},
    CacheStore,
};
use crate::error::Result;
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Response cache held in process memory
///
/// Used when no shared store is configured, and as the store behind tests.
/// Entries are dropped on restart and not shared between replicas.
pub struct MemoryCacheStore {
    max_entries: usize,
    cleanup_interval: Duration,
    store: Arc<RwLock<Inner>>,
}

struct Inner {
    entries: HashMap<CacheKey, CacheEntry>,

    /// LRU tracking: front is least recently used
    lru_queue: VecDeque<CacheKey>,

    stats: CacheStats,
}

impl MemoryCacheStore {
    /// Create a store holding at most `max_entries` responses
    pub fn new(max_entries: usize) -> Self {
        Self::with_cleanup_interval(max_entries, Duration::from_secs(300))
    }

    pub fn with_cleanup_interval(max_entries: usize, cleanup_interval: Duration) -> Self {
        info!("Initializing in-memory response cache (max_entries: {})", max_entries);

        Self {
            max_entries: max_entries.max(1),
            cleanup_interval,
            store: Arc::new(RwLock::new(Inner {
                entries: HashMap::new(),
                lru_queue: VecDeque::new(),
                stats: CacheStats::default(),
            })),
        }
    }

    /// Remove all expired entries, returning how many were dropped
    pub async fn cleanup_expired(&self) -> usize {
        let mut store = self.store.write().await;

        let expired_keys: Vec<CacheKey> = store
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired())
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired_keys {
            Self::remove_entry(&mut store, key);
        }
        store.stats.expired += expired_keys.len() as u64;

        if !expired_keys.is_empty() {
            debug!("Cleaned up {} expired entries", expired_keys.len());
        }
        expired_keys.len()
    }

    /// Get number of entries in cache
    pub async fn len(&self) -> usize {
        self.store.read().await.entries.len()
    }

    /// Check if cache is empty
    pub async fn is_empty(&self) -> bool {
        self.store.read().await.entries.is_empty()
    }

    /// Get a snapshot of the cache statistics
    pub async fn snapshot(&self) -> CacheStats {
        let store = self.store.read().await;
        let mut stats = store.stats.clone();
        stats.entries = store.entries.len();
        stats.size_bytes = store.entries.values().map(|e| e.size_bytes).sum();
        stats
    }

    fn remove_entry(store: &mut Inner, key: &str) {
        if store.entries.remove(key).is_some() {
            store.lru_queue.retain(|k| k != key);
        }
    }

    fn touch(store: &mut Inner, key: &str) {
        store.lru_queue.retain(|k| k != key);
        store.lru_queue.push_back(key.to_string());
    }

    fn evict_if_needed(&self, store: &mut Inner) {
        while store.entries.len() >= self.max_entries {
            match store.lru_queue.pop_front() {
                Some(key) => {
                    debug!("Evicting entry due to max_entries limit: {}", key);
                    store.entries.remove(&key);
                    store.stats.evicted += 1;
                }
                None => break,
            }
        }
    }
}

#[async_trait]
impl CacheStore for MemoryCacheStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let mut store = self.store.write().await;

        let Some(entry) = store.entries.get(key) else {
            debug!("Cache miss: {}", key);
            store.stats.misses += 1;
            return Ok(None);
        };

        if entry.is_expired() {
            debug!("Cache entry expired: {}", key);
            Self::remove_entry(&mut store, key);
            store.stats.misses += 1;
            store.stats.expired += 1;
            return Ok(None);
        }

        let value = entry.value.clone();
        store.stats.hits += 1;
        Self::touch(&mut store, key);

        debug!("Cache hit: {}", key);
        Ok(Some(value))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let entry = CacheEntry::new(key, value.to_string(), ttl);
        let mut store = self.store.write().await;

        if store.entries.contains_key(key) {
            debug!("Replacing cache entry: {}", key);
        } else {
            self.evict_if_needed(&mut store);
            debug!("Inserting cache entry: {}", key);
        }

        store.entries.insert(key.to_string(), entry);
        Self::touch(&mut store, key);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }

    async fn stats(&self) -> Option<CacheStats> {
        Some(self.snapshot().await)
    }
}

/// Background task sweeping expired entries out of a memory store
pub async fn start_auto_cleanup(cache: Arc<MemoryCacheStore>) {
    let interval = cache.cleanup_interval;

    info!("Starting automatic cache cleanup task (interval: {:?})", interval);

    loop {
        tokio::time::sleep(interval).await;

        let removed = cache.cleanup_expired().await;
        if removed > 0 {
            debug!("Auto cleanup removed {} entries", removed);
        } else if cache.len().await >= cache.max_entries {
            warn!("Response cache is full; older entries are being evicted");
        }
    }
}
