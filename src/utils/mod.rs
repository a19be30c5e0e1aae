//! Utility functions for code generation and storage error inspection.
//!
//! - [`code_generator`] - Candidate short code generation
//! - [`random`] - CSPRNG-first random source with fallback
//! - [`db_error`] - Helpers for classifying database errors

pub mod code_generator;
pub mod db_error;
pub mod random;
