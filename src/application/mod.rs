//! Application layer services implementing business logic.
//!
//! Services consume repository traits and provide a clean API for callers.
//!
//! # Available Services
//!
//! - [`services::short_code_service::ShortCodeService`] - Background short code production and handoff
//! - [`services::url_service::UrlService`] - Url shortening and resolution

pub mod services;
