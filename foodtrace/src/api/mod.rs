//! API module for the foodtrace HTTP server

pub mod error;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::AppState;
pub use server::{ApiServer, ApiServerConfig};
