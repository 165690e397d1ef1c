use admiral_core::AppError;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::error;

mod types;

pub use types::ErrorResponse;

/// Message returned for every internal failure.
const SERVICE_ERROR_MESSAGE: &str = "Service Error";

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, kind, message) = match self.0 {
            AppError::Validation(message) => (StatusCode::BAD_REQUEST, "exception", message),
            AppError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            AppError::Conflict(message) => (StatusCode::CONFLICT, "exception", message),
            AppError::Unauthorized(message) => (StatusCode::UNAUTHORIZED, "exception", message),
            AppError::Forbidden(message) => {
                (StatusCode::FORBIDDEN, "authorization_error", message)
            }
            AppError::Throttled(message) => {
                (StatusCode::TOO_MANY_REQUESTS, "exception", message)
            }
            AppError::Internal(message) => {
                error!(%message, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "exception",
                    SERVICE_ERROR_MESSAGE.to_owned(),
                )
            }
        };

        (status, Json(ErrorResponse::new(kind, message))).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;
