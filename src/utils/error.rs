use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use std::fmt;

use crate::database::StoreError;
use crate::services::token_service::TokenError;

#[derive(Debug)]
pub enum AppError {
    /// No bearer credential on a protected route.
    Unauthenticated,
    /// Credential present but it does not verify.
    Forbidden,
    /// Verified caller without the role the route requires.
    Unauthorized,
    NotFound(String),
    InvalidRequest(String),
    Conflict(String),
    DatabaseError(String),
    Internal(String),
}

impl AppError {
    pub fn message(&self) -> String {
        match self {
            AppError::Unauthenticated => "Invalid authorization".to_string(),
            AppError::Forbidden => "Forbidden access".to_string(),
            AppError::Unauthorized => "Unauthorized access".to_string(),
            AppError::NotFound(msg)
            | AppError::InvalidRequest(msg)
            | AppError::Conflict(msg) => msg.clone(),
            AppError::DatabaseError(_) => "Service temporarily unavailable".to_string(),
            AppError::Internal(_) => "Internal server error".to_string(),
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Unauthenticated => write!(f, "Unauthenticated: missing authorization"),
            AppError::Forbidden => write!(f, "Forbidden: token rejected"),
            AppError::Unauthorized => write!(f, "Unauthorized: role check failed"),
            AppError::NotFound(msg) => write!(f, "Not found: {}", msg),
            AppError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            AppError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            AppError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Unauthenticated | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::DatabaseError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            AppError::DatabaseError(_) | AppError::Internal(_) => log::error!("❌ {}", self),
            _ => log::debug!("↩️  {}", self),
        }
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "message": self.message()
        }))
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(msg) => AppError::Conflict(msg),
            StoreError::Serialization(msg) => AppError::InvalidRequest(msg),
            StoreError::Unavailable(msg) => AppError::DatabaseError(msg),
        }
    }
}

impl From<TokenError> for AppError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::ReservedClaim(_) => AppError::InvalidRequest(err.to_string()),
            TokenError::Signing(msg) => AppError::Internal(msg),
            TokenError::Invalid | TokenError::Expired | TokenError::Malformed => AppError::Forbidden,
        }
    }
}
