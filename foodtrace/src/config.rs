//! Service configuration read from the environment

use foodtrace_clients::cache::{redis_url, CacheBackend, CacheConfig};
use std::str::FromStr;
use std::time::Duration;

use crate::error::ConfigError;

/// Everything the service needs to start
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub service_name: String,
    pub service_version: String,
    pub host: String,
    pub port: u16,

    /// Inference engine base URL
    pub ollama_url: String,
    /// Model identifier requests are served with
    pub ollama_model: String,
    pub ollama_timeout: Duration,

    /// Ingredient document API base URL
    pub backend_url: String,
    pub backend_timeout: Duration,

    pub cache: CacheConfig,

    /// Origins allowed to call the API from a browser; `*` mirrors any origin
    pub cors_origins: Vec<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            service_name: "LLM Service".to_string(),
            service_version: "1.0.0".to_string(),
            host: "0.0.0.0".to_string(),
            port: 8000,
            ollama_url: "http://ollama:11434".to_string(),
            ollama_model: "llama2".to_string(),
            ollama_timeout: Duration::from_secs(120),
            backend_url: "http://app:3000".to_string(),
            backend_timeout: Duration::from_secs(10),
            cache: CacheConfig::default(),
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

impl ServiceConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary key lookup.
    ///
    /// Unset keys fall back to defaults; set keys must parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let redis_host = lookup("REDIS_HOST").unwrap_or_else(|| "redis".to_string());
        let redis_port: u16 = parse_or(&lookup, "REDIS_PORT", 6379)?;
        let redis_db: i64 = parse_or(&lookup, "REDIS_DB", 0)?;
        let redis_ttl: u64 =
            parse_or(&lookup, "REDIS_TTL", defaults.cache.default_ttl.as_secs())?;
        let backend: CacheBackend =
            parse_or(&lookup, "CACHE_BACKEND", defaults.cache.backend)?;

        let cache = CacheConfig::builder()
            .backend(backend)
            .redis_url(redis_url(&redis_host, redis_port, redis_db))
            .default_ttl(Duration::from_secs(redis_ttl))
            .build();

        let cors_origins = match lookup("CORS_ORIGINS") {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(String::from)
                .collect(),
            None => defaults.cors_origins,
        };

        let config = Self {
            service_name: lookup("SERVICE_NAME").unwrap_or(defaults.service_name),
            service_version: lookup("SERVICE_VERSION").unwrap_or(defaults.service_version),
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_or(&lookup, "PORT", defaults.port)?,
            ollama_url: lookup("OLLAMA_INTERNAL_URL").unwrap_or(defaults.ollama_url),
            ollama_model: lookup("OLLAMA_MODEL").unwrap_or(defaults.ollama_model),
            ollama_timeout: Duration::from_secs(parse_or(
                &lookup,
                "OLLAMA_TIMEOUT_SECS",
                defaults.ollama_timeout.as_secs(),
            )?),
            backend_url: lookup("BACKEND_INTERNAL_URL").unwrap_or(defaults.backend_url),
            backend_timeout: Duration::from_secs(parse_or(
                &lookup,
                "BACKEND_TIMEOUT_SECS",
                defaults.backend_timeout.as_secs(),
            )?),
            cache,
            cors_origins,
        };

        config.validate().map_err(ConfigError::Invalid)?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.port == 0 {
            return Err("PORT must be greater than 0".to_string());
        }

        if self.ollama_model.trim().is_empty() {
            return Err("OLLAMA_MODEL must not be empty".to_string());
        }

        if self.ollama_timeout.is_zero() || self.backend_timeout.is_zero() {
            return Err("request timeouts must be greater than 0".to_string());
        }

        self.cache.validate()
    }
}

fn parse_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
        None => Ok(default),
    }
}
