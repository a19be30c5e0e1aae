//! Repository trait definitions for the domain layer.
//!
//! Traits define the contract for data operations; implementations live in
//! `crate::infrastructure::persistence`. Mock implementations are generated via
//! `mockall` for unit tests.
//!
//! - [`UrlRepository`] - Url storage and lookup
//! - [`UniquenessOracle`] - Existence check consumed by the short code producer

pub mod uniqueness_oracle;
pub mod url_repository;

pub use uniqueness_oracle::{CodeLookup, UniquenessOracle};
pub use url_repository::UrlRepository;

#[cfg(test)]
pub use uniqueness_oracle::MockUniquenessOracle;
#[cfg(test)]
pub use url_repository::MockUrlRepository;
