//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::config::MESSAGE_USER_NOT_FOUND;

/// Application error types.
///
/// Every store outcome is classified into one of these at the call site,
/// so handlers never see raw driver errors.
#[derive(Error, Debug)]
pub enum AppError {
    // Caller errors
    #[error("{0}")]
    Validation(String),

    #[error("{}", MESSAGE_USER_NOT_FOUND)]
    NotFound,

    #[error("{0} already exist")]
    Conflict(String),

    // Internal failures
    #[error("Database error")]
    Database(#[from] sea_orm::DbErr),

    #[error("Store call timed out")]
    Timeout(String),

    #[error("Internal server error")]
    Internal(String),
}

/// Error response body for everything except not-found
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Not-found responses carry a `status` key instead of `error`
#[derive(Debug, Serialize)]
struct StatusResponse {
    status: String,
}

impl AppError {
    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Database(_) | AppError::Timeout(_) | AppError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Whether this error is an internal failure rather than a caller error
    pub fn is_internal(&self) -> bool {
        self.status().is_server_error()
    }

    /// Get user-facing message (hides internal details)
    pub fn user_message(&self) -> String {
        match self {
            // Show full message for client errors
            AppError::Validation(msg) => msg.clone(),

            // Hide details for internal errors
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                "A database error occurred".to_string()
            }
            AppError::Timeout(operation) => {
                tracing::error!("Store call timed out: {}", operation);
                "The store did not respond in time".to_string()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                "An internal error occurred".to_string()
            }

            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.user_message();

        match self {
            AppError::NotFound => (status, Json(StatusResponse { status: message })).into_response(),
            _ => (status, Json(ErrorResponse { error: message })).into_response(),
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn conflict(entity: impl Into<String>) -> Self {
        AppError::Conflict(entity.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn timeout(operation: impl Into<String>) -> Self {
        AppError::Timeout(operation.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
