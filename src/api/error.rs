//! Mapping from [`CoachError`] to HTTP responses

use crate::error::CoachError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::{error, warn};

/// JSON error body: `{"error": "...", "kind": "..."}`
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
    pub kind: &'static str,
}

/// Handler error wrapper
#[derive(Debug)]
pub struct ApiError(pub CoachError);

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CoachError::MissingCredential => StatusCode::PRECONDITION_FAILED,
            CoachError::InvalidInput(_) | CoachError::InvalidImage(_) => StatusCode::BAD_REQUEST,
            CoachError::ExternalCallFailure(_) => StatusCode::BAD_GATEWAY,
            CoachError::StorageUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<CoachError> for ApiError {
    fn from(err: CoachError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!("Request failed: {}", self.0);
        } else {
            warn!("Request rejected: {}", self.0);
        }

        let body = ErrorBody {
            error: self.0.to_string(),
            kind: self.0.kind(),
        };
        (status, Json(body)).into_response()
    }
}
