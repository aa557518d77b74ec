use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

/// Request-terminating errors. Every failure is terminal; there are no
/// retries anywhere in the service.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing, malformed, expired, or otherwise unverifiable bearer token.
    /// Always produced by the auth gate before any handler runs.
    #[error("{0}")]
    Unauthorized(String),
    /// Missing required field, or an edit/delete target that does not exist
    /// for the authenticated user.
    #[error("{0}")]
    BadRequest(String),
    /// Unhandled store failure.
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Database(err) => {
                tracing::error!("store error: {err}");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
            }
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}
