//! Runtime setup shared by the binary.
//!
//! Installs logging, connects to PostgreSQL, applies migrations and starts the
//! short code producer against the url table.

use std::sync::Arc;

use anyhow::Result;

use crate::application::services::{ShortCodeService, UrlService};
use crate::config::Config;
use crate::infrastructure::database;
use crate::infrastructure::persistence::PgUrlRepository;

/// Running services backed by PostgreSQL.
pub struct App {
    pub pool: sqlx::PgPool,
    pub codes: Arc<ShortCodeService>,
    pub urls: UrlService<PgUrlRepository>,
}

impl App {
    /// Stops the short code producer and closes the pool.
    pub async fn shutdown(self) {
        self.codes.shutdown().await;
        self.pool.close().await;
        tracing::info!("Shutdown complete");
    }
}

/// Initializes logging with the given default level and `text`/`json` format.
///
/// A valid `RUST_LOG` directive takes precedence over `log_level`.
pub fn init_logging(log_level: &str, log_format: &str) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if log_format == "json" {
        subscriber.with(fmt::layer().json()).init();
    } else {
        subscriber.with(fmt::layer()).init();
    }
}

/// Connects to the database and starts the services.
///
/// # Errors
///
/// Returns an error if:
/// - Short code settings are invalid
/// - Database connection fails
/// - Migrations fail
pub async fn start(config: &Config) -> Result<App> {
    let settings = config.short_code.settings()?;

    let pool = database::connect(config).await?;
    database::migrate(&pool).await?;

    let repository = Arc::new(PgUrlRepository::new(Arc::new(pool.clone())));
    let codes = Arc::new(ShortCodeService::start(repository.clone(), settings));
    let urls = UrlService::new(repository, codes.clone());

    Ok(App { pool, codes, urls })
}
