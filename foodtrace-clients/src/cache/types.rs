//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type - a namespaced request fingerprint
pub type CacheKey = String;

/// Cache value type - raw response text
pub type CacheValue = String;

/// Counters kept by the in-process store
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,

    /// Live entries at snapshot time
    pub entries: usize,

    /// Key plus value bytes of live entries
    pub size_bytes: usize,

    /// Entries pushed out by the entry limit
    pub evicted: u64,

    /// Entries dropped after their TTL ran out
    pub expired: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from cache, in `[0, 1]`
    pub fn hit_ratio(&self) -> f64 {
        match self.hits + self.misses {
            0 => 0.0,
            lookups => self.hits as f64 / lookups as f64,
        }
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} hits / {} misses ({:.1}% hit), {} entries ({} bytes), {} evicted, {} expired",
            self.hits,
            self.misses,
            self.hit_ratio() * 100.0,
            self.entries,
            self.size_bytes,
            self.evicted,
            self.expired
        )
    }
}
