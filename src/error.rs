use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid wallet address: {0}")]
    InvalidAddress(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upstream error: {0}")]
    Upstream(String),

    #[error("GraphQL error: {0}")]
    GraphQL(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Validation failures are rejected before any network call and are never retried.
    pub fn is_validation(&self) -> bool {
        matches!(self, AppError::InvalidAddress(_) | AppError::BadRequest(_))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(format!("JSON encoding failed: {}", err))
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if self.is_validation() {
            tracing::debug!("Rejected request: {}", self);
        }

        let (status, code, message) = match self {
            AppError::InvalidAddress(ref msg) => (
                StatusCode::BAD_REQUEST,
                "INVALID_ADDRESS",
                format!("Invalid wallet address: {}", msg),
            ),
            AppError::BadRequest(ref msg) => {
                (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone())
            }
            AppError::Upstream(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "UPSTREAM_ERROR",
                msg.clone(),
            ),
            AppError::GraphQL(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "GRAPHQL_ERROR",
                msg.clone(),
            ),
            AppError::Internal(ref msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                msg.clone(),
            ),
        };

        if status.is_server_error() {
            tracing::error!("Request failed ({}): {}", code, message);
        }

        let body = Json(ErrorResponse {
            error: message,
            code: code.to_string(),
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
