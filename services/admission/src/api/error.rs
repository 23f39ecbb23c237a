//! API error types and helpers.
//!
//! # Purpose and responsibility
//! Centralizes HTTP error response construction so that every non-review
//! failure (unknown routes, unknown kinds, malformed envelopes) has one shape.
//!
//! # Key invariants and assumptions
//! - Error responses include a stable `code` and human-readable `message`.
//! - Status codes align with the error category.
//!
//! Admission denials are not `ApiError`s: a rejected review is a successful
//! HTTP exchange whose body says `allowed: false`.
use crate::api::types::ErrorResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;

/// Structured API error returned by handlers.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ErrorResponse,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status, Json(self.body)).into_response()
    }
}

fn api_error(status: StatusCode, code: &str, message: &str) -> ApiError {
    ApiError {
        status,
        body: ErrorResponse {
            code: code.to_string(),
            message: message.to_string(),
            request_id: None,
        },
    }
}

/// Build a 404 Not Found error.
pub fn api_not_found(message: &str) -> ApiError {
    api_error(StatusCode::NOT_FOUND, "not_found", message)
}

/// Build a 400 Bad Request validation error.
pub fn api_validation_error(message: &str) -> ApiError {
    api_error(StatusCode::BAD_REQUEST, "validation_error", message)
}
