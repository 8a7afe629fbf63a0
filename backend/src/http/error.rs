//! HTTP error handling and response types.

use axum::{
    extract::rejection::{BytesRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::db::repository::RepositoryError;
use crate::prediction::PredictionError;

/// API error response body: `{"error": "<message>"}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

/// Application error type for HTTP handlers.
///
/// The message carried by each variant is what the client sees.
#[derive(Debug)]
pub enum AppError {
    /// Malformed or missing input
    BadRequest(String),
    /// Resource not found
    NotFound(String),
    /// Unique constraint violation or a delete blocked by references
    Conflict(String),
    /// Internal server error; detail has already been logged
    Internal(String),
    /// The request body exceeds the configured limit
    PayloadTooLarge(String),
    /// The prediction service could not be reached
    BadGateway(String),
}

impl AppError {
    /// Map a repository failure onto a response.
    ///
    /// `entity` names the id-scoped resource for not-found replies and
    /// `failure` is the generic message returned for store errors.
    pub fn from_store(err: RepositoryError, entity: &str, failure: &str) -> Self {
        match err {
            RepositoryError::NotFound { .. } => AppError::NotFound(format!("{} not found", entity)),
            RepositoryError::Conflict { message, .. } => AppError::Conflict(message),
            RepositoryError::InvalidReference { message, .. } => AppError::NotFound(message),
            RepositoryError::ValidationError { message, .. } => AppError::BadRequest(message),
            other => {
                tracing::error!(error = %other, "{}", failure);
                AppError::Internal(failure.to_string())
            }
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::PayloadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::BadGateway(_) => StatusCode::BAD_GATEWAY,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::Internal(msg)
            | AppError::PayloadTooLarge(msg)
            | AppError::BadGateway(msg) => msg,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = ApiError {
            error: self.message().to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        tracing::warn!(error = %rejection, "rejected request body");
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            AppError::PayloadTooLarge("Request body too large".to_string())
        } else {
            AppError::BadRequest("Could not read request body".to_string())
        }
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl From<PredictionError> for AppError {
    fn from(err: PredictionError) -> Self {
        tracing::error!(error = %err, "prediction proxy failed");
        if err.is_upstream() {
            AppError::BadGateway("Failed to contact prediction service".to_string())
        } else {
            AppError::Internal("Failed to create prediction request".to_string())
        }
    }
}
