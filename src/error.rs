// src/error.rs
use shuttle_axum::axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};

/// Errors that reach the HTTP boundary. Upstream failures never do: they
/// are answered with fallback content instead.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
}

#[derive(serde::Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        };
        tracing::debug!(status = status.as_u16(), error = %message, "request rejected");
        (status, Json(ErrorBody { error: message })).into_response()
    }
}
