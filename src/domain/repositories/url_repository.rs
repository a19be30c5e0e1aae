//! Repository trait for stored urls.

use crate::domain::entities::{NewUrl, Url};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for storing and looking up urls by short code.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgUrlRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::InMemoryUrlRepository`] - In-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UrlRepository: Send + Sync {
    /// Stores a new url under `new_url.id`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code is already taken.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn save_url(&self, new_url: NewUrl) -> Result<Url, AppError>;

    /// Finds a url by its short code, including soft-deleted rows.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no row has this code.
    /// Returns [`AppError::Internal`] on storage errors.
    async fn get_url_by_id(&self, id: &str) -> Result<Url, AppError>;
}
