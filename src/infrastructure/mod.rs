//! Infrastructure layer for external integrations.
//!
//! This layer implements interfaces defined by the domain layer.
//!
//! # Modules
//!
//! - [`database`] - PostgreSQL pool construction and migrations
//! - [`persistence`] - Repository implementations

pub mod database;
pub mod persistence;
