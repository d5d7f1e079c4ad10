//! Configuration for the response cache

use crate::cache::key::DEFAULT_NAMESPACE;
use std::str::FromStr;
use std::time::Duration;

/// Which store backs the response cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    /// Shared Redis-compatible store
    Redis,
    /// Per-process store; entries are lost on restart
    Memory,
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "redis" => Ok(CacheBackend::Redis),
            "memory" | "in-memory" | "inmemory" => Ok(CacheBackend::Memory),
            other => Err(format!("unknown cache backend '{}'", other)),
        }
    }
}

impl std::fmt::Display for CacheBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheBackend::Redis => write!(f, "redis"),
            CacheBackend::Memory => write!(f, "memory"),
        }
    }
}

/// Configuration for the response cache
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Store implementation to use
    pub backend: CacheBackend,

    /// Connection URL for the Redis backend (`redis://host:port/db`)
    pub redis_url: String,

    /// Time-to-live applied uniformly to every response
    pub default_ttl: Duration,

    /// Upper bound on a single store command, connection set-up included
    pub operation_timeout: Duration,

    /// Maximum number of entries held by the memory backend
    pub max_entries: usize,

    /// Interval for sweeping expired entries out of the memory backend
    pub cleanup_interval: Duration,

    /// Prefix separating response fingerprints from unrelated keys
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            backend: CacheBackend::Redis,
            redis_url: redis_url("redis", 6379, 0),
            // 1 hour
            default_ttl: Duration::from_secs(3600),
            operation_timeout: Duration::from_secs(2),
            max_entries: 10_000,
            // Cleanup every 5 minutes
            cleanup_interval: Duration::from_secs(300),
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

/// Build a Redis connection URL from its parts.
pub fn redis_url(host: &str, port: u16, db: i64) -> String {
    format!("redis://{}:{}/{}", host, port, db)
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_ttl.as_secs() == 0 {
            return Err("default_ttl must be at least one second".to_string());
        }

        if self.max_entries == 0 {
            return Err("max_entries must be greater than 0".to_string());
        }

        if self.operation_timeout.is_zero() {
            return Err("operation_timeout must be greater than 0".to_string());
        }

        if self.namespace.is_empty() {
            return Err("namespace must not be empty".to_string());
        }

        if self.backend == CacheBackend::Redis && !self.redis_url.starts_with("redis") {
            return Err(format!("redis_url '{}' is not a redis:// URL", self.redis_url));
        }

        Ok(())
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    backend: Option<CacheBackend>,
    redis_url: Option<String>,
    default_ttl: Option<Duration>,
    operation_timeout: Option<Duration>,
    max_entries: Option<usize>,
    cleanup_interval: Option<Duration>,
    namespace: Option<String>,
}

impl CacheConfigBuilder {
    /// Select the store implementation
    pub fn backend(mut self, backend: CacheBackend) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Set the Redis connection URL
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.redis_url = Some(url.into());
        self
    }

    /// Set default TTL for cache entries
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set the per-command timeout
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.operation_timeout = Some(timeout);
        self
    }

    /// Set maximum number of cache entries (memory backend)
    pub fn max_entries(mut self, max: usize) -> Self {
        self.max_entries = Some(max);
        self
    }

    /// Set cleanup interval (memory backend)
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = Some(interval);
        self
    }

    /// Set the key namespace
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            backend: self.backend.unwrap_or(defaults.backend),
            redis_url: self.redis_url.unwrap_or(defaults.redis_url),
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
            operation_timeout: self.operation_timeout.unwrap_or(defaults.operation_timeout),
            max_entries: self.max_entries.unwrap_or(defaults.max_entries),
            cleanup_interval: self.cleanup_interval.unwrap_or(defaults.cleanup_interval),
            namespace: self.namespace.unwrap_or(defaults.namespace),
        }
    }
}
