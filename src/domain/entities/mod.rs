//! Core domain entities.
//!
//! - [`Url`] - A destination stored under a short code
//! - [`NewUrl`] - Input for storing a url
//! - [`ShortCode`] - A code validated as free by the generation pipeline

pub mod short_code;
pub mod url;

pub use short_code::ShortCode;
pub use self::url::{NewUrl, Url, validate_destination};
