//! # Error Types for Foundational Parsing
//!
//! Errors raised when constructing core types from untrusted input.
//! All errors use `thiserror` for derive-based `Display` and `Error`
//! implementations.

use thiserror::Error;

/// Errors from parsing or validating core primitives.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Timestamp string is not valid UTC RFC 3339.
    #[error("invalid timestamp {input:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },

    /// Role string is not a member of the closed role enumeration.
    #[error("unknown role: {0:?} (expected one of: driver, admin, viewer)")]
    UnknownRole(String),

    /// Identifier string is not a valid UUID.
    #[error("invalid identifier {input:?}: {reason}")]
    InvalidIdentifier {
        /// The rejected input.
        input: String,
        /// Why it was rejected.
        reason: String,
    },
}
