//! Ingredient traceability chat service
//!
//! Answers natural-language questions about traceable food ingredients by
//! combining a snapshot of the ingredient catalog with an LLM, caching
//! answers by request fingerprint.

pub mod api;
pub mod chat;
pub mod config;
pub mod context;
pub mod error;
pub mod orchestrator;

pub use api::{ApiServer, ApiServerConfig};
pub use chat::{ChatRequest, ChatResponse};
pub use config::ServiceConfig;
pub use error::{ChatError, ConfigError};
pub use orchestrator::{
    ChatOrchestrator, Collaborator, FailureClass, OrchestratorConfig, ServiceHealth,
};
