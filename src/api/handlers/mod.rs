pub mod bot;
pub mod controller;
pub mod system;

pub use bot::*;
pub use controller::*;
pub use system::*;

use axum::{http::StatusCode, Json};

use crate::api::types::ErrorResponse;
use crate::error::RelayError;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<ErrorResponse>);

/// Map a relay error onto its HTTP status and body
pub fn api_error(err: RelayError) -> ApiError {
    match err {
        RelayError::Unauthorized(message) => (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Unauthorized".to_string(),
                message: Some(message),
            }),
        ),
        RelayError::InvalidArgument(message) => (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: message,
                message: None,
            }),
        ),
        RelayError::NotFound(message) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "NotFound".to_string(),
                message: Some(message),
            }),
        ),
        other => {
            tracing::error!("Relay error: {}", other);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: other.kind().to_string(),
                    message: Some(other.to_string()),
                }),
            )
        }
    }
}
