//! Collaborator Health Check Demo
//!
//! Probes the ingredient backend, the inference engine and the response
//! cache, printing status and timing for each.
//!
//! Usage:
//!   cargo run --example health_check_demo
//!
//! Environment variables:
//!   BACKEND_INTERNAL_URL - Document API base URL (default: http://localhost:3000)
//!   OLLAMA_INTERNAL_URL  - Ollama base URL (default: http://localhost:11434)
//!   OLLAMA_MODEL         - Model identifier (default: llama2)
//!   REDIS_URL            - Cache URL (default: redis://localhost:6379/0)

use foodtrace_clients::cache::{CacheStore, RedisCacheStore};
use foodtrace_clients::health::{probe, ProbeConfig, ProbeTarget};
use foodtrace_clients::inference::{ChatBackend, OllamaClient, DEFAULT_INFERENCE_TIMEOUT};
use foodtrace_clients::ingredients::{BackendClient, IngredientSource, DEFAULT_BACKEND_TIMEOUT};
use std::time::Duration;
use tracing::{info, Level};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("=== Collaborator Health Check Demo ===");

    let backend_url = std::env::var("BACKEND_INTERNAL_URL")
        .unwrap_or_else(|_| "http://localhost:3000".to_string());
    let ollama_url = std::env::var("OLLAMA_INTERNAL_URL")
        .unwrap_or_else(|_| "http://localhost:11434".to_string());
    let model = std::env::var("OLLAMA_MODEL").unwrap_or_else(|_| "llama2".to_string());
    let redis_url =
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379/0".to_string());

    let backend = BackendClient::new(&backend_url, DEFAULT_BACKEND_TIMEOUT)?;
    let engine = OllamaClient::new(&ollama_url, &model, DEFAULT_INFERENCE_TIMEOUT)?;
    let cache = RedisCacheStore::new(&redis_url, Duration::from_secs(2))?;

    let config = ProbeConfig::default();
    let results = vec![
        probe(ProbeTarget::Backend, &config, backend.ping()).await,
        probe(ProbeTarget::Inference, &config, engine.ping()).await,
        probe(ProbeTarget::Cache, &config, cache.ping()).await,
    ];

    for result in &results {
        info!("\n--- {} ---", result.target);
        info!("Status: {:?}", result.status);
        info!("Response time: {}ms", result.response_time_ms);
        if let Some(error) = &result.error {
            info!("Error: {}", error);
        }
    }

    info!("\n--- Model Availability ---");
    match engine.list_models().await {
        Ok(models) => info!("Resident models: {:?}", models),
        Err(e) => info!("Could not list models: {}", e),
    }

    info!("\n--- JSON Serialization Demo ---");
    let json = serde_json::to_string_pretty(&results)?;
    info!("Probe results as JSON:\n{}", json);

    info!("\n=== Demo Complete ===");

    Ok(())
}
