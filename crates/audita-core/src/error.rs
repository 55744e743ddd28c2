//! # Error Types — Core Validation Errors
//!
//! Errors raised while constructing the foundational types. All errors use
//! `thiserror` for derive-based `Display` and `Error` implementations.
//! Higher layers wrap these in their own domain errors; nothing here maps
//! to an HTTP status directly.

use thiserror::Error;

/// Errors raised by validated constructors in `audita-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// The CUIL is not 11 digits after normalization.
    #[error("invalid CUIL {0:?}: expected 11 digits (hyphens optional)")]
    InvalidCuil(String),

    /// The timestamp string is not valid RFC 3339.
    #[error("invalid timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The offending input.
        value: String,
        /// Parser diagnostic.
        reason: String,
    },

    /// The role string is not one of the eight known roles.
    #[error("unknown role {0:?}")]
    UnknownRole(String),

    /// The identifier string is empty or whitespace.
    #[error("empty identifier for {0}")]
    EmptyIdentifier(&'static str),
}
