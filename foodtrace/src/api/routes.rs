//! API routes for the foodtrace server

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use tracing::debug;

use super::error::ApiError;
use crate::chat::{ChatRequest, ChatResponse};
use crate::orchestrator::ChatOrchestrator;

/// Application state
pub struct AppState {
    pub orchestrator: Arc<ChatOrchestrator>,
    pub service_name: String,
    pub service_version: String,
}

/// Root response
#[derive(Serialize)]
pub struct RootResponse {
    pub service: String,
    pub version: String,
    pub status: String,
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
    pub ollama_connected: bool,
}

/// Service identification
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(RootResponse {
        service: state.service_name.clone(),
        version: state.service_version.clone(),
        status: "running".to_string(),
    })
}

/// Health check endpoint; degraded while the inference engine does not
/// answer within the health-check timeout
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let ollama_connected = state.orchestrator.engine_connected().await;

    Json(HealthResponse {
        status: if ollama_connected { "healthy" } else { "degraded" }.to_string(),
        service: state.service_name.clone(),
        version: state.service_version.clone(),
        ollama_connected,
    })
}

/// Per-collaborator probe results
pub async fn health_details(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let health = state.orchestrator.health().await;
    let status = if health.is_operational() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(health))
}

/// Answer a question about the ingredient catalog
pub async fn chat(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let response = state.orchestrator.chat(request).await?;
    Ok(Json(response))
}

/// Single ingredient record by batch number
pub async fn get_ingredient(
    State(state): State<Arc<AppState>>,
    Path(batch_number): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    debug!("Looking up batch {}", batch_number);
    match state.orchestrator.lookup_ingredient(&batch_number).await? {
        Some(record) => Ok(Json(json!({ "data": record }))),
        None => Err(ApiError::not_found(format!(
            "Ingredient {} not found",
            batch_number
        ))),
    }
}
