//! Business logic services for the application layer.

pub mod short_code_service;
pub mod url_service;

pub use short_code_service::{ShortCodeService, ShortCodeSettings};
pub use url_service::UrlService;
