//! Error types shared across layers.
//!
//! [`AppError`] is the application-wide error carrying a human readable message
//! plus structured JSON details. [`ShortCodeError`] is what callers of the
//! short-code pipeline can observe.

use serde_json::{Value, json};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{message}")]
    Validation { message: String, details: Value },
    #[error("{message}")]
    NotFound { message: String, details: Value },
    #[error("{message}")]
    Conflict { message: String, details: Value },
    #[error("{message}")]
    Internal { message: String, details: Value },
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }
    pub fn not_found(message: impl Into<String>, details: Value) -> Self {
        Self::NotFound {
            message: message.into(),
            details,
        }
    }
    pub fn conflict(message: impl Into<String>, details: Value) -> Self {
        Self::Conflict {
            message: message.into(),
            details,
        }
    }
    pub fn internal(message: impl Into<String>, details: Value) -> Self {
        Self::Internal {
            message: message.into(),
            details,
        }
    }

    /// Stable machine-readable code for the error kind.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation { .. } => "validation_error",
            AppError::NotFound { .. } => "not_found",
            AppError::Conflict { .. } => "conflict",
            AppError::Internal { .. } => "internal_error",
        }
    }

    pub fn details(&self) -> &Value {
        match self {
            AppError::Validation { details, .. }
            | AppError::NotFound { details, .. }
            | AppError::Conflict { details, .. }
            | AppError::Internal { details, .. } => details,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AppError::NotFound { .. })
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        if matches!(e, sqlx::Error::RowNotFound) {
            return AppError::not_found("Row not found", json!({}));
        }

        if let Some(db) = e.as_database_error()
            && db.is_unique_violation()
        {
            return AppError::conflict(
                "Unique constraint violation",
                json!({ "constraint": db.constraint() }),
            );
        }

        tracing::error!(error = %e, "database error");
        AppError::internal("Database error", json!({ "reason": e.to_string() }))
    }
}

/// Errors surfaced to callers waiting on a short code.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortCodeError {
    /// The producer went through `cycles` consecutive batches without finding a
    /// free code.
    #[error("short code space exhausted after {cycles} consecutive cycles")]
    CodeSpaceExhausted { cycles: u32 },
    /// Uniqueness checks kept failing for `cycles` consecutive batches, so no
    /// candidate could be confirmed either way.
    #[error("uniqueness checks failing for {cycles} consecutive cycles: {cause}")]
    OracleUnavailable { cycles: u32, cause: String },
    /// The producer has stopped; no further codes will be delivered.
    #[error("short code producer is not running")]
    Closed,
}

impl From<ShortCodeError> for AppError {
    fn from(e: ShortCodeError) -> Self {
        match e {
            ShortCodeError::CodeSpaceExhausted { cycles } => AppError::internal(
                "Failed to generate unique code",
                json!({ "reason": "Too many collisions", "cycles": cycles }),
            ),
            ShortCodeError::OracleUnavailable { cycles, cause } => AppError::internal(
                "Short code storage is unavailable",
                json!({ "reason": "Uniqueness check failed", "cycles": cycles, "cause": cause }),
            ),
            ShortCodeError::Closed => AppError::internal(
                "Short code generator is unavailable",
                json!({ "reason": "producer stopped" }),
            ),
        }
    }
}
