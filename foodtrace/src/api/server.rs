//! API server for foodtrace

use anyhow::Result;
use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use foodtrace_clients::ChatBackend;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::routes::{chat, get_ingredient, health_check, health_details, root, AppState};
use crate::config::ServiceConfig;
use crate::orchestrator::ChatOrchestrator;

/// Configuration for the API server
#[derive(Debug, Clone)]
pub struct ApiServerConfig {
    pub host: String,
    pub port: u16,
    pub service_name: String,
    pub service_version: String,
    pub cors_origins: Vec<String>,
}

impl Default for ApiServerConfig {
    fn default() -> Self {
        Self::from(&ServiceConfig::default())
    }
}

impl ApiServerConfig {
    /// `host:port` the API binds to
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl From<&ServiceConfig> for ApiServerConfig {
    fn from(config: &ServiceConfig) -> Self {
        Self {
            host: config.host.clone(),
            port: config.port,
            service_name: config.service_name.clone(),
            service_version: config.service_version.clone(),
            cors_origins: config.cors_origins.clone(),
        }
    }
}

/// Build the application router
pub fn router(state: Arc<AppState>, cors_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/health/details", get(health_details))
        .route("/chat", post(chat))
        .route("/chat/", post(chat))
        .route("/ingredients/:batch_number", get(get_ingredient))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(cors_origins)),
        )
}

/// Credentialed CORS for the configured origins; `*` mirrors the caller.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::mirror_request()
    } else {
        AllowOrigin::list(origins.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!("Ignoring invalid CORS origin: {}", origin))
                .ok()
        }))
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// API server
pub struct ApiServer {
    config: ApiServerConfig,
    orchestrator: Arc<ChatOrchestrator>,
}

impl ApiServer {
    /// Create a new API server with configuration
    pub fn new(config: ApiServerConfig, orchestrator: Arc<ChatOrchestrator>) -> Self {
        Self {
            config,
            orchestrator,
        }
    }

    /// Bind the configured address and serve until shutdown
    pub async fn start(self) -> Result<()> {
        let listener = TcpListener::bind(self.config.bind_addr()).await?;
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(self, listener: TcpListener) -> Result<()> {
        info!(
            "Starting {} v{}",
            self.config.service_name, self.config.service_version
        );
        info!(
            "Model: {}, cache: {}",
            self.orchestrator.model_id(),
            self.orchestrator.cache_backend()
        );

        // Start-up checks never prevent serving
        let engine = self.orchestrator.engine();
        if engine.check_availability().await {
            info!("Inference engine connection successful");
            if !engine.ensure_model_available().await {
                warn!(
                    "Model {} is not available; chat requests will fail",
                    engine.model_id()
                );
            }
        } else {
            warn!(
                "Inference engine connection failed - service will start but may not work properly"
            );
        }

        let state = Arc::new(AppState {
            orchestrator: self.orchestrator.clone(),
            service_name: self.config.service_name.clone(),
            service_version: self.config.service_version.clone(),
        });
        let app = router(state, &self.config.cors_origins);

        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        info!("Shutting down {}", self.config.service_name);
        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_service_config() {
        let config = ApiServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 8000);
        assert_eq!(config.bind_addr(), "0.0.0.0:8000");
        assert_eq!(config.service_name, "LLM Service");
        assert_eq!(config.cors_origins, vec!["http://localhost:3000".to_string()]);
    }
}
