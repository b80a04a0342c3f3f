use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

use crate::application::todo_service::ServiceError;
use crate::domain::error::StoreError;

/// Error body returned by every endpoint: `{"message": "..."}`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(skip, default = "internal_status")]
    pub status: StatusCode,
    pub message: String,
}

fn internal_status() -> StatusCode { StatusCode::INTERNAL_SERVER_ERROR }

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self { Self::new(StatusCode::BAD_REQUEST, message) }

    pub fn not_found(message: impl Into<String>) -> Self { Self::new(StatusCode::NOT_FOUND, message) }
}

impl From<ServiceError> for ApiError {
    fn from(err: ServiceError) -> Self {
        let status = match &err {
            ServiceError::IdMismatch { .. } | ServiceError::Store(StoreError::Validation(_)) => StatusCode::BAD_REQUEST,
            ServiceError::Store(StoreError::NotFound(_)) => StatusCode::NOT_FOUND,
            ServiceError::Store(StoreError::Query(_) | StoreError::Backend(_)) => {
                tracing::error!(error = %err, "storage failure");
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response { (self.status, axum::Json(self)).into_response() }
}
