//! Existence check used by the short code producer.

use crate::error::AppError;
use async_trait::async_trait;

/// Answer to "is this code already stored?".
///
/// A failed check is kept apart from a confirmed collision so the producer can
/// retry it instead of silently dropping the candidate.
#[derive(Debug)]
pub enum CodeLookup {
    /// A row with this code exists.
    Found,
    /// No row with this code exists at check time.
    NotFound,
    /// The storage could not answer.
    CheckFailed(AppError),
}

impl CodeLookup {
    /// Classifies the result of a lookup by id.
    ///
    /// A row means `Found`, [`AppError::NotFound`] means `NotFound`, and any
    /// other error means `CheckFailed`.
    pub fn from_result<T>(result: Result<T, AppError>) -> Self {
        match result {
            Ok(_) => CodeLookup::Found,
            Err(e) if e.is_not_found() => CodeLookup::NotFound,
            Err(e) => CodeLookup::CheckFailed(e),
        }
    }

    /// Label used for logs and metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            CodeLookup::Found => "found",
            CodeLookup::NotFound => "not_found",
            CodeLookup::CheckFailed(_) => "check_failed",
        }
    }
}

/// Storage-side existence check for candidate short codes.
///
/// Implementations must be safe to call concurrently; the producer issues no
/// writes and holds no locks of its own.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UniquenessOracle: Send + Sync {
    async fn lookup(&self, code: &str) -> CodeLookup;
}
