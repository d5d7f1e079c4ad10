//! HTTP mapping of request failures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::error::ChatError;

/// Error returned by handlers, rendered as `{"detail": ...}`
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl ApiError {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status,
            detail: detail.into(),
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, detail)
    }
}

impl From<ChatError> for ApiError {
    fn from(err: ChatError) -> Self {
        match err {
            ChatError::InvalidRequest(reason) => {
                Self::new(StatusCode::UNPROCESSABLE_ENTITY, reason)
            }
            err @ (ChatError::Inference(_) | ChatError::Collaborator { .. }) => Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to generate response: {}", err),
            ),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "detail": self.detail }))).into_response()
    }
}
