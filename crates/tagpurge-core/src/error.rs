//! Error types for tagpurge domain validation.
//!
//! Everything in this crate is pure, so the only failures are inputs that
//! cannot be turned into something the CDN accepts. All errors implement
//! `std::error::Error` via `thiserror`.
//!
//! # Example
//!
//! ```
//! use tagpurge_core::{Result, SurrogateKey, TagpurgeError};
//!
//! fn key(raw: &str) -> Result<SurrogateKey> {
//!     SurrogateKey::parse(raw)
//! }
//!
//! assert!(key("abcd").is_ok());
//! assert!(matches!(key("a b"), Err(TagpurgeError::InvalidSurrogateKey { .. })));
//! ```

use thiserror::Error;

/// Main error type for tagpurge domain operations.
#[derive(Debug, Error)]
pub enum TagpurgeError {
    /// The configured hash length is outside the supported range.
    #[error("Invalid hash length {length}: must be between 1 and {max}")]
    InvalidHashLength {
        /// The rejected length
        length: usize,
        /// Upper bound that was exceeded
        max: usize,
    },

    /// A surrogate key cannot be sent in a `Surrogate-Key` header.
    #[error("Invalid surrogate key '{key}': {reason}")]
    InvalidSurrogateKey {
        /// The rejected key
        key: String,
        /// Why it was rejected
        reason: String,
    },

    /// A URL cannot be purged.
    #[error("Invalid purge URL '{url}': {reason}")]
    InvalidUrl {
        /// The rejected URL
        url: String,
        /// Why it was rejected
        reason: String,
    },
}

impl TagpurgeError {
    /// Creates an InvalidSurrogateKey error.
    pub fn invalid_surrogate_key(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidSurrogateKey {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidUrl error.
    pub fn invalid_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if the error was caused by caller-supplied input
    /// rather than configuration.
    pub fn is_bad_input(&self) -> bool {
        matches!(
            self,
            Self::InvalidSurrogateKey { .. } | Self::InvalidUrl { .. }
        )
    }
}

/// Type alias for Results with TagpurgeError.
pub type Result<T> = std::result::Result<T, TagpurgeError>;
