//! Unified error types for the domain layer
//!
//! Provides a common error type that can be used across all domain operations,
//! enabling consistent error handling without forcing adapters to use String or anyhow.

use thiserror::Error;

/// Unified error type for domain operations
#[derive(Debug, Error, Clone)]
pub enum DomainError {
    /// Validation failed (e.g., invalid field values)
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Parse error (for value objects)
    #[error("Parse error: {0}")]
    Parse(String),

    /// Unknown taxonomy key
    #[error("Unknown taxonomy entry: {category} / {subcategory}")]
    UnknownTaxonomyEntry {
        category: &'static str,
        subcategory: String,
    },
}

impl DomainError {
    /// Creates a validation error for business rule violations.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Creates a parse error for string-to-type conversion failures.
    ///
    /// Use this in `FromStr` implementations when the input string
    /// doesn't match any known variant or format.
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::Parse(msg.into())
    }

    /// Create an unknown taxonomy entry error
    pub fn unknown_taxonomy(category: &'static str, subcategory: impl Into<String>) -> Self {
        Self::UnknownTaxonomyEntry {
            category,
            subcategory: subcategory.into(),
        }
    }
}
