//! Stored response with its expiry

use crate::cache::types::CacheValue;
use std::time::{Duration, Instant};

/// Longest lifetime an entry can be given
const MAX_TTL: Duration = Duration::from_secs(365 * 24 * 60 * 60);

/// One cached response in the in-process store
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub value: CacheValue,

    /// Key plus value bytes, counted toward the store's size statistic
    pub size_bytes: usize,

    expires_at: Instant,
}

impl CacheEntry {
    /// Entry for `key` that expires `ttl` from now (capped at one year)
    pub fn new(key: &str, value: CacheValue, ttl: Duration) -> Self {
        Self {
            size_bytes: key.len() + value.len(),
            value,
            expires_at: Instant::now() + ttl.min(MAX_TTL),
        }
    }

    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}
