//! Command line entry point for url-shortcode.
//!
//! # Usage
//!
//! ```bash
//! # Print fresh short codes checked against the database
//! cargo run -- sample --count 10
//!
//! # Same, against an empty in-memory store (no database needed)
//! cargo run -- sample --count 10 --in-memory
//!
//! # Store a url under a new short code
//! cargo run -- shorten https://example.com --user-id 42
//!
//! # Look up a short code
//! cargo run -- resolve abd2e
//!
//! # Check database connection
//! cargo run -- db check
//! ```
//!
//! # Environment Variables
//!
//! See [`url_shortcode::config`] for the full list.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;

use url_shortcode::application::services::ShortCodeService;
use url_shortcode::bootstrap;
use url_shortcode::config::{self, ShortCodeConfig};
use url_shortcode::infrastructure::database;
use url_shortcode::infrastructure::persistence::InMemoryUrlRepository;

/// URL shortener backend tools.
#[derive(Parser)]
#[command(name = "url-shortcode")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand)]
enum Commands {
    /// Print fresh short codes from the producer
    Sample {
        /// Number of codes to print
        #[arg(short, long, default_value_t = 5)]
        count: usize,

        /// Check candidates against an empty in-memory store
        #[arg(long)]
        in_memory: bool,
    },
    /// Store a destination under a new short code
    Shorten {
        /// Absolute destination URL
        destination: String,

        /// Owner of the url
        #[arg(short, long, default_value_t = 0)]
        user_id: i64,
    },
    /// Look up a short code
    Resolve {
        /// Short code to look up
        code: String,
    },
    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let (log_level, log_format) = config::log_settings_from_env();
    bootstrap::init_logging(&log_level, &log_format);

    match cli.command {
        Commands::Sample {
            count,
            in_memory: true,
        } => sample_in_memory(count).await?,
        Commands::Sample { count, .. } => sample(count).await?,
        Commands::Shorten {
            destination,
            user_id,
        } => shorten(&destination, user_id).await?,
        Commands::Resolve { code } => resolve(&code).await?,
        Commands::Db { action } => handle_db_action(action).await?,
    }

    Ok(())
}

fn load_config() -> Result<config::Config> {
    let config = config::load_from_env().context("Failed to load configuration")?;
    config.print_summary();
    Ok(config)
}

/// Prints `count` codes checked against PostgreSQL. Codes are not stored.
async fn sample(count: usize) -> Result<()> {
    let config = load_config()?;
    let app = bootstrap::start(&config).await?;

    print_codes(&app.codes, count).await?;

    app.shutdown().await;
    Ok(())
}

async fn sample_in_memory(count: usize) -> Result<()> {
    let settings = ShortCodeConfig::from_env()?.settings()?;
    let codes = ShortCodeService::start(Arc::new(InMemoryUrlRepository::new()), settings);

    print_codes(&codes, count).await?;

    codes.shutdown().await;
    Ok(())
}

async fn print_codes(codes: &ShortCodeService, count: usize) -> Result<()> {
    println!("{}", "🎲 Short codes".bright_blue().bold());
    println!();

    for n in 1..=count {
        let code = codes
            .get_code()
            .await
            .map_err(|e| anyhow::anyhow!("Failed to get short code: {}", e))?;

        println!(
            "  {:>3}  {}",
            n.to_string().bright_black(),
            code.as_str().bright_yellow().bold()
        );
    }

    println!();
    Ok(())
}

async fn shorten(destination: &str, user_id: i64) -> Result<()> {
    let config = load_config()?;
    let app = bootstrap::start(&config).await?;

    let result = app.urls.shorten(destination, user_id, None).await;
    app.shutdown().await;

    let url = result.map_err(|e| anyhow::anyhow!("Failed to shorten url: {}", e))?;

    println!("{}", "✅ Url stored".green().bold());
    println!("  Code:        {}", url.id.bright_yellow().bold());
    println!("  Destination: {}", url.destination.cyan());
    println!(
        "  Created:     {}",
        url.created_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );

    Ok(())
}

async fn resolve(code: &str) -> Result<()> {
    let config = load_config()?;
    let app = bootstrap::start(&config).await?;

    let result = app.urls.resolve(code).await;
    app.shutdown().await;

    match result {
        Ok(url) => {
            println!("{} → {}", url.id.bright_yellow().bold(), url.destination.cyan());
        }
        Err(e) if e.is_not_found() => {
            println!("{} {}", "❌".red(), e.to_string().red());
        }
        Err(e) => return Err(anyhow::anyhow!("Failed to resolve url: {}", e)),
    }

    Ok(())
}

async fn handle_db_action(action: DbAction) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            let config = load_config()?;
            let pool = database::connect(&config).await?;
            let version = database::server_version(&pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
            println!("  PostgreSQL: {}", version.bright_white());

            pool.close().await;
        }
    }

    Ok(())
}
