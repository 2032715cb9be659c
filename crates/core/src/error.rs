//! Error types for Marrow operations.
//!
//! This module defines the main error type [`MarrowError`]. Note that the
//! extraction pass itself never fails: a document without a body or without
//! any text is reported through [`crate::Extraction::NotFound`]. Errors are
//! reserved for the surfaces around it: selector queries and configuration.
//! File handling belongs to the CLI.
//!
//! # Example
//!
//! ```rust
//! use marrow_core::{ExtractConfig, MarrowError};
//!
//! let err = ExtractConfig::builder().top_candidates(0).build().unwrap_err();
//! assert!(matches!(err, MarrowError::InvalidConfig(_)));
//! ```

use thiserror::Error;

/// Main error type for article body extraction.
#[derive(Error, Debug)]
pub enum MarrowError {
    /// HTML query errors.
    ///
    /// Returned when a CSS selector passed to [`crate::Document::select`]
    /// cannot be parsed.
    #[error("Failed to parse HTML: {0}")]
    HtmlParseError(String),

    /// A tunable in [`crate::ExtractConfig`] is out of range.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// Result type alias for MarrowError.
pub type Result<T> = std::result::Result<T, MarrowError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = MarrowError::HtmlParseError("Invalid selector: [[".to_string());
        assert!(err.to_string().contains("Failed to parse HTML"));
    }

    #[test]
    fn test_invalid_config_error() {
        let err = MarrowError::InvalidConfig("top_candidates must be at least 1".to_string());
        assert!(err.to_string().contains("top_candidates"));
    }

    #[test]
    fn test_builder_reports_invalid_config() {
        let err = crate::ExtractConfig::builder().top_candidates(0).build().unwrap_err();
        assert!(matches!(err, MarrowError::InvalidConfig(_)));
        assert!(err.to_string().starts_with("Invalid configuration"));
    }
}
