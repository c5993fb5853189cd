// HTTP API error types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

/// API error with the status codes and bodies the Kotha web client expects:
/// 401/403 are bare text, 400/500 carry an `{ "error": ... }` JSON envelope.
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized (missing, malformed or expired token)
    Unauthorized(String),

    // 403 Forbidden (valid identity, wrong owner)
    Forbidden(String),

    // 500 Internal Server Error
    InternalServerError(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::InternalServerError(msg) => msg,
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }
}

// Convert other error types to ApiError
impl From<crate::store::StoreError> for ApiError {
    fn from(err: crate::store::StoreError) -> Self {
        // Log the real cause but never leak it to the caller
        tracing::error!("store error: {}", err);
        ApiError::internal_server_error("internal server error")
    }
}

impl From<crate::auth::TokenError> for ApiError {
    fn from(err: crate::auth::TokenError) -> Self {
        match err {
            crate::auth::TokenError::MissingSecret | crate::auth::TokenError::Generation(_) => {
                tracing::error!("token service failure: {}", err);
                ApiError::internal_server_error("internal server error")
            }
            crate::auth::TokenError::Expired => ApiError::unauthorized("token expired"),
            crate::auth::TokenError::Invalid(_) => ApiError::unauthorized("invalid token"),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        match self {
            // Auth failures are bare text bodies
            ApiError::Unauthorized(msg) | ApiError::Forbidden(msg) => {
                (status, msg).into_response()
            }
            // Everything else uses the JSON error envelope
            other => (status, Json(json!({ "error": other.message() }))).into_response(),
        }
    }
}

/// Handler result: a raw JSON payload or an `ApiError` response.
pub type ApiResult<T> = Result<T, ApiError>;
