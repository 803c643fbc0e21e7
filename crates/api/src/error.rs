//! HTTP error responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use service::ServiceError;
use thiserror::Error;
use tracing::error;

/// `{"message": ...}` body shared by errors and plain acknowledgements
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Handler failures. The client only ever sees the generic message; the
/// cause is logged.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("condition is invalid")]
    InvalidCondition,

    #[error("Unable to update stations")]
    Ingest(#[source] ServiceError),

    #[error("unable to get stations")]
    ListStations(#[source] ServiceError),

    #[error("Unable to get station")]
    GetStation(#[source] ServiceError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidCondition => StatusCode::BAD_REQUEST,
            ApiError::Ingest(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::ListStations(_) | ApiError::GetStation(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::InvalidCondition => {}
            ApiError::Ingest(cause) | ApiError::ListStations(cause) | ApiError::GetStation(cause) => {
                error!("{}: {}", self, cause);
            }
        }
        (self.status(), Json(MessageResponse::new(self.to_string()))).into_response()
    }
}
