//! In-memory implementation of url repository.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;

use crate::domain::entities::{NewUrl, Url};
use crate::domain::repositories::{CodeLookup, UniquenessOracle, UrlRepository};
use crate::error::AppError;

/// Url storage kept in a [`DashMap`] keyed by short code.
///
/// Used by tests and by the CLI when no database is wanted. Sharded locking
/// lets the producer look codes up while other tasks save.
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    storage: DashMap<String, Url>,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Marks a stored url as deleted. Returns false if the code is unknown.
    pub fn soft_delete(&self, id: &str) -> bool {
        match self.storage.get_mut(id) {
            Some(mut url) => {
                let now = Utc::now();
                url.deleted_at = Some(now);
                url.updated_at = now;
                true
            }
            None => false,
        }
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn save_url(&self, new_url: NewUrl) -> Result<Url, AppError> {
        match self.storage.entry(new_url.id.as_str().to_owned()) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "Url already exists",
                json!({ "id": new_url.id.as_str() }),
            )),
            Entry::Vacant(slot) => {
                let now = Utc::now();
                let url = Url {
                    id: new_url.id.into_inner(),
                    destination: new_url.destination,
                    user_id: new_url.user_id,
                    expires_at: new_url.expires_at,
                    created_at: now,
                    updated_at: now,
                    deleted_at: None,
                };
                slot.insert(url.clone());
                Ok(url)
            }
        }
    }

    async fn get_url_by_id(&self, id: &str) -> Result<Url, AppError> {
        self.storage
            .get(id)
            .map(|url| url.value().clone())
            .ok_or_else(|| AppError::not_found("Url not found", json!({ "id": id })))
    }
}

#[async_trait]
impl UniquenessOracle for InMemoryUrlRepository {
    async fn lookup(&self, code: &str) -> CodeLookup {
        CodeLookup::from_result(self.get_url_by_id(code).await)
    }
}
