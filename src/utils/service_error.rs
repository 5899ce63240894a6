// Service error type shared across the business-logic layer
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found")]
    NotFound,

    #[error("Invalid transition: {0}")]
    InvalidTransition(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Insufficient wallet balance")]
    InsufficientBalance,

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error")]
    InternalError,
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            ServiceError::DatabaseError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ServiceError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            ServiceError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            ServiceError::InvalidTransition(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            ServiceError::Conflict(msg) => (StatusCode::CONFLICT, msg),
            ServiceError::InsufficientBalance => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "Insufficient wallet balance".to_string(),
            ),
            ServiceError::CacheError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            ServiceError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            ServiceError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
            ServiceError::InternalError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

// Conversion from various error types
impl From<diesel::result::Error> for ServiceError {
    fn from(error: diesel::result::Error) -> Self {
        match error {
            diesel::result::Error::NotFound => ServiceError::NotFound,
            _ => ServiceError::DatabaseError(error.to_string()),
        }
    }
}

impl From<redis::RedisError> for ServiceError {
    fn from(error: redis::RedisError) -> Self {
        ServiceError::CacheError(error.to_string())
    }
}

impl From<validator::ValidationErrors> for ServiceError {
    fn from(error: validator::ValidationErrors) -> Self {
        ServiceError::ValidationError(error.to_string())
    }
}

impl From<crate::models::user::UserError> for ServiceError {
    fn from(error: crate::models::user::UserError) -> Self {
        use crate::models::user::UserError;
        match error {
            UserError::NotFound => ServiceError::NotFound,
            UserError::EmailTaken => {
                ServiceError::Conflict("Email already registered".to_string())
            },
            UserError::Database(e) => ServiceError::DatabaseError(e.to_string()),
            UserError::Pool(e) => ServiceError::DatabaseError(e),
        }
    }
}

impl From<crate::models::assignment::TransitionError> for ServiceError {
    fn from(error: crate::models::assignment::TransitionError) -> Self {
        use crate::models::assignment::TransitionError;
        match error {
            TransitionError::InvalidTransition { .. } => {
                ServiceError::InvalidTransition(error.to_string())
            },
            TransitionError::Forbidden { .. } => ServiceError::Forbidden(error.to_string()),
            TransitionError::MissingReason => {
                ServiceError::ValidationError("A rejection reason is required".to_string())
            },
        }
    }
}
