//! API Error Types
//!
//! Every failure leaves the API as a JSON body with a stable string code,
//! a human-readable message and the request id when one is known.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use gamesales_db::DbError;
use gamesales_types::GameSalesError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// API Result type
pub type ApiResult<T> = Result<T, ApiError>;

/// API Error type
#[derive(Debug, Error)]
pub enum ApiError {
    // =========================================================================
    // Session Errors
    // =========================================================================
    #[error("Missing or unknown user")]
    Unauthorized,

    #[error("Your account is awaiting approval")]
    AwaitingApproval,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    // =========================================================================
    // Request Errors
    // =========================================================================
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    // =========================================================================
    // Resource Errors
    // =========================================================================
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    // =========================================================================
    // Internal Errors
    // =========================================================================
    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Database error")]
    DatabaseError,

    #[error("Service unavailable")]
    ServiceUnavailable,
}

impl ApiError {
    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "UNAUTHORIZED",
            Self::AwaitingApproval => "AWAITING_APPROVAL",
            Self::Forbidden(_) => "FORBIDDEN",
            Self::BadRequest(_) => "BAD_REQUEST",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Conflict(_) => "CONFLICT",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) | Self::ValidationError(_) => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::AwaitingApproval | Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Internal(_) | Self::DatabaseError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// API error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Stable error code
    pub code: String,
    /// Human-readable error message
    pub msg: String,
    /// Request ID for tracking
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

impl From<&ApiError> for ErrorResponse {
    fn from(err: &ApiError) -> Self {
        Self {
            code: err.error_code().to_string(),
            msg: err.to_string(),
            request_id: None,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::from(&self))).into_response()
    }
}

impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound(msg) => Self::NotFound(msg),
            DbError::Conflict(msg) => Self::Conflict(msg),
            DbError::InvalidInput(msg) => Self::BadRequest(msg),
            other => {
                tracing::error!(error = ?other, "Database error");
                Self::DatabaseError
            }
        }
    }
}

impl From<GameSalesError> for ApiError {
    fn from(err: GameSalesError) -> Self {
        match err {
            GameSalesError::InvalidInput { .. } => Self::ValidationError(err.to_string()),
            GameSalesError::NotFound { entity, id } => Self::NotFound(format!("{} {}", entity, id)),
            GameSalesError::AwaitingApproval { .. } => Self::AwaitingApproval,
            GameSalesError::Forbidden { reason } => Self::Forbidden(reason),
            GameSalesError::Conflict { reason } => Self::Conflict(reason),
            GameSalesError::Internal { message } => Self::Internal(message),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::ValidationError(format_validation_errors(&err))
    }
}

/// Flatten validator output into `field: message` pairs
pub fn format_validation_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, msg)
            })
        })
        .collect();
    if parts.is_empty() {
        parts.push(errors.to_string());
    }
    parts.sort();
    parts.join(", ")
}
