use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tokio_postgres::error::SqlState;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Database(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::InvalidBody(_) | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            ApiError::Database(_) => "DATABASE_ERROR",
            ApiError::Unavailable(_) => "SERVICE_UNAVAILABLE",
            ApiError::InvalidBody(_) => "INVALID_BODY",
            ApiError::Validation(_) => "VALIDATION_ERROR",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match self {
            ApiError::Database(ref err) => {
                tracing::error!("Database error: {}", err);
                "A database error occurred".to_string()
            }
            ApiError::Unavailable(ref err) => {
                tracing::warn!("Database unavailable: {}", err);
                "Database service is temporarily unavailable".to_string()
            }
            ApiError::InvalidBody(ref message) => {
                tracing::debug!("Rejected request body: {}", message);
                message.clone()
            }
            ApiError::Validation(ref message) => {
                tracing::debug!("Validation error: {}", message);
                message.clone()
            }
            ApiError::Conflict(ref message) => {
                tracing::debug!("Constraint conflict: {}", message);
                message.clone()
            }
            ApiError::Internal(ref err) => {
                tracing::error!("Internal server error: {:#}", err);
                "An internal server error occurred".to_string()
            }
        };

        let body = Json(json!({
            "error": {
                "code": self.code(),
                "message": message
            }
        }));

        (self.status(), body).into_response()
    }
}

// Covers empty bodies, syntax errors, shape mismatches and a missing
// `Content-Type: application/json` header.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::InvalidBody(rejection.body_text())
    }
}

impl From<tokio_postgres::Error> for ApiError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            tracing::error!("PostgreSQL connection closed: {}", err);
            return ApiError::Unavailable("Database connection closed".to_string());
        }

        match err.code() {
            Some(&SqlState::UNIQUE_VIOLATION) => {
                let message = if err.to_string().contains("email") {
                    "Email address already exists"
                } else {
                    "Resource already exists"
                };
                ApiError::conflict(message)
            }
            Some(&SqlState::NOT_NULL_VIOLATION) => {
                ApiError::validation("Required field is missing")
            }
            Some(&SqlState::CHECK_VIOLATION) => {
                ApiError::validation("Data validation constraint violated")
            }
            Some(&SqlState::STRING_DATA_RIGHT_TRUNCATION) => {
                ApiError::validation("Text data exceeds maximum length")
            }
            Some(&SqlState::CONNECTION_EXCEPTION)
            | Some(&SqlState::CONNECTION_DOES_NOT_EXIST)
            | Some(&SqlState::CONNECTION_FAILURE) => {
                tracing::error!("PostgreSQL connection error: {}", err);
                ApiError::Unavailable("Database connection unavailable".to_string())
            }
            Some(&SqlState::UNDEFINED_TABLE) => {
                tracing::error!("PostgreSQL schema error (is the users table present?): {}", err);
                ApiError::Database("Users table is missing".to_string())
            }
            _ => {
                tracing::error!("Unhandled PostgreSQL error: {} (code: {:?})", err, err.code());
                ApiError::Database("Database operation failed".to_string())
            }
        }
    }
}

impl From<deadpool_postgres::PoolError> for ApiError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        match err {
            deadpool_postgres::PoolError::Timeout(_) => {
                tracing::warn!("Database connection pool timeout: {}", err);
                ApiError::Unavailable("Database connection timeout".to_string())
            }
            deadpool_postgres::PoolError::Closed => {
                tracing::error!("Database connection pool is closed");
                ApiError::Unavailable("Database pool closed".to_string())
            }
            deadpool_postgres::PoolError::Backend(e) => ApiError::from(e),
            deadpool_postgres::PoolError::NoRuntimeSpecified => {
                ApiError::Internal(anyhow::anyhow!("Database pool has no runtime configured"))
            }
            other => {
                tracing::error!("Database connection pool error: {}", other);
                ApiError::Unavailable("Database connection unavailable".to_string())
            }
        }
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
