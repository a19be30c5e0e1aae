//! Domain layer containing business entities and repository contracts.
//!
//! - [`alphabet`] - Length bounds and character sets for short codes
//! - [`entities`] - Core business data structures
//! - [`repositories`] - Data access trait definitions
//!
//! The domain layer has no dependencies on infrastructure. The short code
//! pipeline itself lives in [`crate::application::services`].

pub mod alphabet;
pub mod entities;
pub mod repositories;
