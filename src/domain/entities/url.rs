//! Url entity representing a stored destination behind a short code.

use chrono::{DateTime, Utc};
use serde_json::json;

use crate::domain::entities::ShortCode;
use crate::error::AppError;

/// A destination URL stored under a short code.
///
/// `deleted_at` marks a soft-deleted row; such rows still occupy their code.
#[derive(Debug, Clone, PartialEq)]
pub struct Url {
    pub id: String,
    pub destination: String,
    pub user_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Url {
    /// Returns true if the url has been soft-deleted.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Returns true if the url has passed its expiry time.
    pub fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|e| Utc::now() >= e)
    }
}

/// Input data for storing a new url.
#[derive(Debug, Clone)]
pub struct NewUrl {
    pub id: ShortCode,
    pub destination: String,
    pub user_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
}

impl NewUrl {
    /// Builds a new url after checking that `destination` is an absolute URL.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the destination is empty or cannot be
    /// parsed.
    pub fn new(
        id: ShortCode,
        destination: impl Into<String>,
        user_id: i64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Self, AppError> {
        Ok(Self {
            id,
            destination: validate_destination(&destination.into())?,
            user_id,
            expires_at,
        })
    }

    /// Returns a copy with a different short code, keeping the payload.
    pub fn with_id(&self, id: ShortCode) -> Self {
        Self {
            id,
            ..self.clone()
        }
    }
}

/// Checks that `destination` is a non-empty absolute URL and returns it trimmed.
///
/// # Errors
///
/// Returns [`AppError::Validation`] if the destination is empty or cannot be
/// parsed.
pub fn validate_destination(destination: &str) -> Result<String, AppError> {
    let trimmed = destination.trim();

    if trimmed.is_empty() {
        return Err(AppError::bad_request(
            "Destination must not be empty",
            json!({}),
        ));
    }

    ::url::Url::parse(trimmed).map_err(|e| {
        AppError::bad_request(
            "Invalid URL format",
            json!({ "destination": trimmed, "reason": e.to_string() }),
        )
    })?;

    Ok(trimmed.to_string())
}
