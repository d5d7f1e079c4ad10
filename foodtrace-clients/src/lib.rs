//! # Foodtrace collaborator clients (foodtrace-clients)
//!
//! Async clients for the three services the traceability chat pipeline
//! depends on, each behind a trait so callers can substitute fakes.
//!
//! ## Features
//!
//! - Ingredient document API client ([`ingredients::BackendClient`])
//! - Ollama inference client with model pull support ([`inference::OllamaClient`])
//! - Response cache stores: Redis and in-process LRU ([`cache`])
//! - Deterministic cache fingerprints ([`cache::CacheKeyDeriver`])
//! - Timed reachability probes with degraded state detection ([`health`])
//!
//! ## Probing collaborators
//!
//! ```no_run
//! use foodtrace_clients::health::{probe, ProbeConfig, ProbeTarget};
//! use foodtrace_clients::ingredients::{BackendClient, IngredientSource, DEFAULT_BACKEND_TIMEOUT};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let backend = BackendClient::new("http://app:3000", DEFAULT_BACKEND_TIMEOUT)?;
//!
//!     let result = probe(ProbeTarget::Backend, &ProbeConfig::default(), backend.ping()).await;
//!     println!("Backend: {:?} in {}ms", result.status, result.response_time_ms);
//!     Ok(())
//! }
//! ```
//!
//! ## Generating a reply
//!
//! ```no_run
//! use foodtrace_clients::inference::{ChatBackend, OllamaClient, DEFAULT_INFERENCE_TIMEOUT};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let engine = OllamaClient::new("http://ollama:11434", "llama2", DEFAULT_INFERENCE_TIMEOUT)?;
//!
//!     if engine.ensure_model_available().await {
//!         let reply = engine
//!             .generate_response("Which batches failed testing?", None, &[], 0.7)
//!             .await?;
//!         println!("{}", reply);
//!     }
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod error;
pub mod health;
pub mod inference;
pub mod ingredients;

// Re-export main types for convenience
pub use cache::{
    CacheBackend, CacheConfig, CacheConfigBuilder, CacheKey, CacheKeyDeriver, CacheStats,
    CacheStore, CacheValue, MemoryCacheStore, RedisCacheStore,
};
pub use error::{ClientError, Result};
pub use health::{HealthStatus, ProbeConfig, ProbeResult, ProbeTarget};
pub use inference::{ChatBackend, ChatMessage, OllamaClient, Role};
pub use ingredients::{BackendClient, IngredientRecord, IngredientSource};
