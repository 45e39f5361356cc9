/// Error types for Murmur Service
///
/// Every failure a handler can return is an [`AppError`]; it renders as a
/// JSON body `{"message": ..., "status": ...}` with the matching HTTP status.
use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use crypto_core::CryptoError;
use record_store::StoreError;
use thiserror::Error;

/// Result type for murmur-service operations
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    /// Resource not found
    #[error("{0}")]
    NotFound(String),

    /// Duplicate email or username
    #[error("{0}")]
    Conflict(String),

    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, invalid or expired bearer token
    #[error("{0}")]
    Unauthorized(String),

    /// Authenticated user does not own the resource
    #[error("{0}")]
    Forbidden(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_not_found() -> Self {
        AppError::NotFound("User not found".to_string())
    }

    pub fn post_not_found() -> Self {
        AppError::NotFound("Post not found".to_string())
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) | AppError::Validation(_) | AppError::InvalidCredentials => {
                StatusCode::BAD_REQUEST
            }
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Store(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
            return HttpResponse::build(status).json(serde_json::json!({
                "message": "Server error",
                "error": self.to_string(),
                "status": status.as_u16(),
            }));
        }

        HttpResponse::build(status).json(serde_json::json!({
            "message": self.to_string(),
            "status": status.as_u16(),
        }))
    }
}

impl From<CryptoError> for AppError {
    fn from(err: CryptoError) -> Self {
        match err {
            CryptoError::InvalidToken(_) | CryptoError::TokenExpired => {
                AppError::Unauthorized("Invalid or expired token".to_string())
            }
            other => AppError::Internal(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}
