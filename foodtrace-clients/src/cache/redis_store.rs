//! Redis-backed response cache

use crate::cache::{config::CacheConfig, types::CacheValue, CacheStore};
use crate::error::{ClientError, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::future::Future;
use std::time::Duration;
use tokio::sync::OnceCell;
use tracing::{debug, info};

/// Cache store speaking to a Redis-compatible server
///
/// The connection is established on first use and shared by every request;
/// `ConnectionManager` re-establishes it after the server drops. Each command,
/// including the initial connect, is bounded by `operation_timeout`.
pub struct RedisCacheStore {
    client: redis::Client,
    connection: OnceCell<ConnectionManager>,
    operation_timeout: Duration,
    url: String,
}

impl RedisCacheStore {
    /// Create a store for `url` without connecting yet
    pub fn new(url: &str, operation_timeout: Duration) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| ClientError::Config(format!("invalid redis URL '{}': {}", url, e)))?;

        info!("Response cache backed by redis at {}", url);

        Ok(Self {
            client,
            connection: OnceCell::new(),
            operation_timeout,
            url: url.to_string(),
        })
    }

    pub fn from_config(config: &CacheConfig) -> Result<Self> {
        Self::new(&config.redis_url, config.operation_timeout)
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    async fn connection(&self) -> Result<ConnectionManager> {
        let manager = self
            .connection
            .get_or_try_init(|| async {
                debug!("Connecting to redis at {}", self.url);
                self.bounded("CONNECT", ConnectionManager::new(self.client.clone()))
                    .await
            })
            .await?;
        Ok(manager.clone())
    }

    async fn bounded<T, F>(&self, command: &str, fut: F) -> Result<T>
    where
        F: Future<Output = redis::RedisResult<T>>,
    {
        match tokio::time::timeout(self.operation_timeout, fut).await {
            Ok(result) => {
                result.map_err(|e| ClientError::Cache(format!("{} failed: {}", command, e)))
            }
            Err(_) => Err(ClientError::Timeout {
                timeout_seconds: self.operation_timeout.as_secs(),
                context: format!("redis {}", command),
            }),
        }
    }
}

#[async_trait]
impl CacheStore for RedisCacheStore {
    fn backend_name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> Result<Option<CacheValue>> {
        let mut conn = self.connection().await?;
        let value = self
            .bounded("GET", conn.get::<_, Option<String>>(key))
            .await?;

        debug!(key, hit = value.is_some(), "redis GET");
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<()> {
        let mut conn = self.connection().await?;
        let ttl_secs = ttl.as_secs().max(1);
        self.bounded("SET", conn.set_ex::<_, _, ()>(key, value, ttl_secs))
            .await?;

        debug!(key, ttl_secs, "redis SET");
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.connection().await?;
        let pong: String = self
            .bounded("PING", redis::cmd("PING").query_async(&mut conn))
            .await?;

        if pong.eq_ignore_ascii_case("PONG") {
            Ok(())
        } else {
            Err(ClientError::Cache(format!("unexpected PING reply: {}", pong)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_url_is_config_error() {
        let result = RedisCacheStore::new("not a url", Duration::from_secs(1));
        assert!(matches!(result, Err(ClientError::Config(_))));
    }

    #[tokio::test]
    async fn test_unreachable_server_reports_error() {
        // Port 1 is reserved and refuses connections
        let store =
            RedisCacheStore::new("redis://127.0.0.1:1/0", Duration::from_millis(500)).unwrap();

        let result = store.get("llm_cache:missing").await;
        assert!(result.is_err());
        assert!(result.unwrap_err().is_unavailable());

        assert!(store.set("k", "v", Duration::from_secs(1)).await.is_err());
        assert!(store.ping().await.is_err());
    }
}
