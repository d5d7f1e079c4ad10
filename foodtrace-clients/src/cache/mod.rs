//! # Response Cache
//!
//! Cache-aside storage for generated responses, keyed by request fingerprint.
//!
//! ## Features
//!
//! - **Deterministic keys**: SHA-256 fingerprints of (message, model, context)
//! - **TTL-Based Expiration**: one uniform time-to-live, no proactive invalidation
//! - **Pluggable stores**: Redis for shared deployments, in-process LRU otherwise
//!
//! Store failures are reported as [`ClientError`](crate::error::ClientError);
//! callers treat them as misses, since caching is an optimisation.
//!
//! ## Example
//!
//! ```rust
//! use foodtrace_clients::cache::{derive_key, CacheStore, MemoryCacheStore};
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let cache = MemoryCacheStore::new(1_000);
//! let key = derive_key("Which batches passed?", "llama2", "batch: B1, ...");
//!
//! cache.set(&key, "B1 passed.", Duration::from_secs(3600)).await?;
//!
//! if let Some(value) = cache.get(&key).await? {
//!     println!("Cache hit: {}", value);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod key;
pub mod redis_store;
pub mod store;
pub mod types;

pub use config::{redis_url, CacheBackend, CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use key::{derive_key, CacheKeyDeriver, DEFAULT_NAMESPACE};
pub use redis_store::RedisCacheStore;
pub use store::{start_auto_cleanup, MemoryCacheStore};
pub use types::{CacheKey, CacheStats, CacheValue};

use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Expiring key-value store holding generated responses
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Short name for logs and health output
    fn backend_name(&self) -> &'static str;

    /// Fetch a live entry; expired entries read as absent
    async fn get(&self, key: &str) -> Result<Option<CacheValue>>;

    /// Write an entry, replacing any previous value under the key
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()>;

    /// Cheap reachability check
    async fn ping(&self) -> Result<()>;

    /// Hit/miss statistics, when the store keeps them
    async fn stats(&self) -> Option<CacheStats> {
        None
    }
}

/// Build the store selected by `config`.
///
/// For the memory backend a cleanup task is spawned on the current runtime.
pub fn connect(config: &CacheConfig) -> Result<Arc<dyn CacheStore>> {
    match config.backend {
        CacheBackend::Redis => Ok(Arc::new(RedisCacheStore::from_config(config)?)),
        CacheBackend::Memory => {
            let store = Arc::new(MemoryCacheStore::with_cleanup_interval(
                config.max_entries,
                config.cleanup_interval,
            ));
            tokio::spawn(start_auto_cleanup(store.clone()));
            Ok(store)
        }
    }
}
