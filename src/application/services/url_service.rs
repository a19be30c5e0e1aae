//! Url shortening and resolution service.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::json;
use tracing::{info, warn};

use crate::application::services::ShortCodeService;
use crate::domain::entities::{NewUrl, Url, validate_destination};
use crate::domain::repositories::UrlRepository;
use crate::error::AppError;

/// Attempts to store a url before giving up on save-time conflicts.
const MAX_SAVE_ATTEMPTS: usize = 5;

/// Service for storing destinations under pipeline-issued short codes.
///
/// The pipeline only checks codes at a point in time, so a concurrent writer
/// (another process running its own pipeline) can claim the same code before
/// we save it. A conflict on save takes a fresh code and tries again.
pub struct UrlService<R: UrlRepository> {
    repository: Arc<R>,
    codes: Arc<ShortCodeService>,
}

impl<R: UrlRepository> UrlService<R> {
    /// Creates a new url service.
    pub fn new(repository: Arc<R>, codes: Arc<ShortCodeService>) -> Self {
        Self { repository, codes }
    }

    /// Stores `destination` under a fresh short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the destination is not an absolute URL.
    /// Returns [`AppError::Conflict`] if every attempt hit a taken code.
    /// Returns [`AppError::Internal`] if no code could be obtained or on
    /// storage errors.
    pub async fn shorten(
        &self,
        destination: &str,
        user_id: i64,
        expires_at: Option<DateTime<Utc>>,
    ) -> Result<Url, AppError> {
        let destination = validate_destination(destination)?;

        let mut new_url = NewUrl {
            id: self.codes.get_code().await?,
            destination,
            user_id,
            expires_at,
        };

        for attempt in 1..=MAX_SAVE_ATTEMPTS {
            match self.repository.save_url(new_url.clone()).await {
                Ok(url) => {
                    info!(code = %url.id, user_id, "Url stored");
                    return Ok(url);
                }
                Err(AppError::Conflict { .. }) => {
                    warn!(attempt, code = %new_url.id, "Short code taken at save time, retrying");
                    new_url = new_url.with_id(self.codes.get_code().await?);
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::conflict(
            "Failed to store url under a unique code",
            json!({ "attempts": MAX_SAVE_ATTEMPTS }),
        ))
    }

    /// Looks up a live url by its short code.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code is unknown, soft-deleted or
    /// expired. Returns [`AppError::Internal`] on storage errors.
    pub async fn resolve(&self, id: &str) -> Result<Url, AppError> {
        let url = self.repository.get_url_by_id(id).await?;

        if url.is_deleted() {
            return Err(AppError::not_found(
                "Url already deleted",
                json!({ "id": id }),
            ));
        }

        if url.is_expired() {
            return Err(AppError::not_found(
                "Url expired",
                json!({ "id": id, "expires_at": url.expires_at }),
            ));
        }

        Ok(url)
    }
}
