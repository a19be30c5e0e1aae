//! PostgreSQL implementation of url repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewUrl, Url};
use crate::domain::repositories::{CodeLookup, UniquenessOracle, UrlRepository};
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_id;

const URL_COLUMNS: &str =
    "id, destination, user_id, expires_at, created_at, updated_at, deleted_at";

#[derive(Debug, sqlx::FromRow)]
struct UrlRow {
    id: String,
    destination: String,
    user_id: i64,
    expires_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    deleted_at: Option<DateTime<Utc>>,
}

impl From<UrlRow> for Url {
    fn from(row: UrlRow) -> Self {
        Url {
            id: row.id,
            destination: row.destination,
            user_id: row.user_id,
            expires_at: row.expires_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
            deleted_at: row.deleted_at,
        }
    }
}

/// PostgreSQL repository for url storage and lookup.
///
/// Also serves as the uniqueness oracle for the short code pipeline.
pub struct PgUrlRepository {
    pool: Arc<PgPool>,
}

impl PgUrlRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UrlRepository for PgUrlRepository {
    async fn save_url(&self, new_url: NewUrl) -> Result<Url, AppError> {
        let query = format!(
            "INSERT INTO urls (id, destination, user_id, expires_at) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {URL_COLUMNS}"
        );

        let row = sqlx::query_as::<_, UrlRow>(&query)
            .bind(new_url.id.as_str())
            .bind(&new_url.destination)
            .bind(new_url.user_id)
            .bind(new_url.expires_at)
            .fetch_one(self.pool.as_ref())
            .await
            .map_err(|e| {
                if is_unique_violation_on_id(&e) {
                    AppError::conflict("Url already exists", json!({ "id": new_url.id.as_str() }))
                } else {
                    AppError::from(e)
                }
            })?;

        Ok(row.into())
    }

    async fn get_url_by_id(&self, id: &str) -> Result<Url, AppError> {
        let query = format!("SELECT {URL_COLUMNS} FROM urls WHERE id = $1");

        let row = sqlx::query_as::<_, UrlRow>(&query)
            .bind(id)
            .fetch_optional(self.pool.as_ref())
            .await?;

        row.map(Url::from)
            .ok_or_else(|| AppError::not_found("Url not found", json!({ "id": id })))
    }
}

#[async_trait]
impl UniquenessOracle for PgUrlRepository {
    async fn lookup(&self, code: &str) -> CodeLookup {
        CodeLookup::from_result(self.get_url_by_id(code).await)
    }
}
