//! Cache-aside chat pipeline
//!
//! For every request: snapshot the ingredient data, render it into context,
//! fingerprint (message, model, context), answer from cache when possible and
//! otherwise ask the inference engine and store its reply.
//!
//! Every collaborator result goes through one policy table
//! ([`Collaborator::failure_class`]): the data provider and cache store
//! degrade, the inference engine does not.
//! Concurrent identical misses each call the engine; the last write wins.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use foodtrace_clients::cache::{self, CacheKeyDeriver, CacheStats, CacheStore};
use foodtrace_clients::health::{probe, ProbeConfig, ProbeResult, ProbeTarget};
use foodtrace_clients::inference::{ChatBackend, OllamaClient};
use foodtrace_clients::ingredients::{BackendClient, IngredientRecord, IngredientSource};
use foodtrace_clients::ClientError;
use serde::Serialize;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::chat::{ChatRequest, ChatResponse};
use crate::config::ServiceConfig;
use crate::context::{build_context, full_system_prompt};
use crate::error::ChatError;

/// Sampling temperature for every generation
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// External services the pipeline depends on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collaborator {
    DataProvider,
    CacheStore,
    Inference,
}

/// How a collaborator failure affects the request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    /// Continue with a fallback value
    Degradable,
    /// Fail the request
    Fatal,
}

impl Collaborator {
    pub fn failure_class(&self) -> FailureClass {
        match self {
            // Empty context still lets the engine answer
            Collaborator::DataProvider => FailureClass::Degradable,
            // Caching is an optimisation
            Collaborator::CacheStore => FailureClass::Degradable,
            Collaborator::Inference => FailureClass::Fatal,
        }
    }
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Collaborator::DataProvider => write!(f, "ingredient backend"),
            Collaborator::CacheStore => write!(f, "cache store"),
            Collaborator::Inference => write!(f, "inference engine"),
        }
    }
}

/// Resolve a collaborator result through its failure class: degradable
/// failures are logged and replaced by `fallback`, fatal ones fail the request.
fn settle<T>(
    collaborator: Collaborator,
    result: Result<T, ClientError>,
    fallback: impl FnOnce() -> T,
) -> Result<T, ChatError> {
    let err = match result {
        Ok(value) => return Ok(value),
        Err(err) => err,
    };

    match collaborator.failure_class() {
        FailureClass::Degradable => {
            if err.is_unavailable() {
                warn!("{} unavailable, continuing without it: {}", collaborator, err);
            } else {
                warn!("{} answered unusably, continuing without it: {}", collaborator, err);
            }
            Ok(fallback())
        }
        FailureClass::Fatal => {
            error!("{} failed: {}", collaborator, err);
            Err(ChatError::from_collaborator(collaborator, err))
        }
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    pub temperature: f32,
    /// Lifetime of cached responses
    pub cache_ttl: Duration,
    /// Prefix for response fingerprints
    pub key_namespace: String,
    pub probe: ProbeConfig,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            cache_ttl: Duration::from_secs(3600),
            key_namespace: cache::DEFAULT_NAMESPACE.to_string(),
            probe: ProbeConfig::default(),
        }
    }
}

/// Per-collaborator health snapshot
#[derive(Debug, Clone, Serialize)]
pub struct ServiceHealth {
    pub inference: ProbeResult,
    pub cache: ProbeResult,
    pub backend: ProbeResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_stats: Option<CacheStats>,
}

impl ServiceHealth {
    /// The service can answer only while the engine is reachable
    pub fn is_operational(&self) -> bool {
        self.inference.is_connected()
    }
}

pub struct ChatOrchestrator {
    ingredients: Arc<dyn IngredientSource>,
    cache: Arc<dyn CacheStore>,
    engine: Arc<dyn ChatBackend>,
    keys: CacheKeyDeriver,
    config: OrchestratorConfig,
}

impl ChatOrchestrator {
    pub fn new(
        ingredients: Arc<dyn IngredientSource>,
        cache: Arc<dyn CacheStore>,
        engine: Arc<dyn ChatBackend>,
        config: OrchestratorConfig,
    ) -> Self {
        let keys = CacheKeyDeriver::new(config.key_namespace.clone());
        Self {
            ingredients,
            cache,
            engine,
            keys,
            config,
        }
    }

    /// Wire up the production collaborators described by `config`.
    ///
    /// No connection is made here; must run inside a tokio runtime.
    pub fn from_config(config: &ServiceConfig) -> Result<Self, ClientError> {
        let orchestrator_config = OrchestratorConfig {
            cache_ttl: config.cache.default_ttl,
            key_namespace: config.cache.namespace.clone(),
            ..Default::default()
        };

        let ingredients =
            Arc::new(BackendClient::new(&config.backend_url, config.backend_timeout)?);
        let engine = Arc::new(
            OllamaClient::new(
                &config.ollama_url,
                &config.ollama_model,
                config.ollama_timeout,
            )?
            .with_probe_timeout(orchestrator_config.probe.timeout),
        );
        let cache = cache::connect(&config.cache)?;

        Ok(Self::new(ingredients, cache, engine, orchestrator_config))
    }

    pub fn model_id(&self) -> &str {
        self.engine.model_id()
    }

    pub fn engine(&self) -> &Arc<dyn ChatBackend> {
        &self.engine
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend_name()
    }

    /// Answer one chat request.
    pub async fn chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        let span = info_span!("chat", request_id = %Uuid::new_v4());
        self.run_chat(request).instrument(span).await
    }

    async fn run_chat(&self, request: ChatRequest) -> Result<ChatResponse, ChatError> {
        if request.message.is_empty() {
            return Err(ChatError::InvalidRequest("message must not be empty".to_string()));
        }

        let context = self.fetch_context().await?;
        let system_prompt = full_system_prompt(&context);
        let history = request.history();
        let model = self.model_id().to_string();

        let key = self.keys.derive_key(&request.message, &model, &context);

        let cached = settle(Collaborator::CacheStore, self.cache.get(&key).await, || None)?;
        if let Some(response) = cached {
            info!("Cache hit for {}", key);
            return Ok(ChatResponse { response, model });
        }
        debug!("Cache miss for {}", key);

        let generated = self
            .engine
            .generate_response(
                &request.message,
                Some(&system_prompt),
                history,
                self.config.temperature,
            )
            .await;
        let response = settle(Collaborator::Inference, generated, String::new)?;

        settle(
            Collaborator::CacheStore,
            self.cache.set(&key, &response, self.config.cache_ttl).await,
            || (),
        )?;

        info!("Generated {} chars with {}", response.len(), model);
        Ok(ChatResponse { response, model })
    }

    /// Current snapshot rendered as context; sentinel on provider failure.
    pub async fn fetch_context(&self) -> Result<String, ChatError> {
        let records = settle(
            Collaborator::DataProvider,
            self.ingredients.list_all_ingredients().await,
            Vec::new,
        )?;
        debug!("Building context from {} records", records.len());
        Ok(build_context(&records))
    }

    /// One record by batch; absent when unknown or the backend is down.
    pub async fn lookup_ingredient(
        &self,
        batch_number: &str,
    ) -> Result<Option<IngredientRecord>, ChatError> {
        settle(
            Collaborator::DataProvider,
            self.ingredients.get_ingredient_by_batch(batch_number).await,
            || None,
        )
    }

    /// Whether the inference engine answers a ping within the health-check timeout
    pub async fn engine_connected(&self) -> bool {
        probe(ProbeTarget::Inference, &self.config.probe, self.engine.ping())
            .await
            .is_connected()
    }

    /// Probe every collaborator concurrently.
    pub async fn health(&self) -> ServiceHealth {
        let probe_config = &self.config.probe;
        let (inference, cache, backend, cache_stats) = futures::join!(
            probe(ProbeTarget::Inference, probe_config, self.engine.ping()),
            probe(ProbeTarget::Cache, probe_config, self.cache.ping()),
            probe(ProbeTarget::Backend, probe_config, self.ingredients.ping()),
            self.cache.stats(),
        );

        ServiceHealth {
            inference,
            cache,
            backend,
            cache_stats,
        }
    }
}
