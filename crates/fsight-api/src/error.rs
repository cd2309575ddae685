//! API error types.
//!
//! The wire contract is deliberately terse: decode and validation
//! failures return `400 {"detail": "Invalid image"}`, everything else
//! returns `500 {"detail": "Server Error"}`. Specific causes go to the
//! logs only, never to the client.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use fsight_vision::VisionError;
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

pub type ApiResult<T> = Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid image: {0}")]
    InvalidImage(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Vision(#[from] VisionError),
}

impl ApiError {
    pub fn invalid_image(msg: impl Into<String>) -> Self {
        Self::InvalidImage(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidImage(_) | ApiError::Vision(VisionError::InvalidImage(_)) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Internal(_) | ApiError::Vision(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let detail = if status == StatusCode::BAD_REQUEST {
            warn!(cause = %self, "Rejecting invalid image");
            "Invalid image"
        } else {
            error!(cause = %self, "Request failed");
            "Server Error"
        };

        let body = ErrorResponse {
            detail: detail.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
