//! # Authentication and Authorization Errors
//!
//! Every failure mode is a distinguishable variant so callers can render an
//! accurate message: missing token, unverifiable token, expired token, and
//! role rejection are different things and map to different HTTP statuses
//! at the API edge.

use thiserror::Error;

use frex_core::Role;

/// Errors from token verification, guard evaluation, and login flows.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No bearer token was presented.
    #[error("no bearer token presented")]
    Unauthenticated,

    /// The token does not have the expected structure.
    #[error("malformed token")]
    Malformed,

    /// The token's signature does not match.
    #[error("token signature verification failed")]
    InvalidSignature,

    /// The token is past its expiry.
    #[error("token expired")]
    Expired,

    /// The token verified but the role is not in the allowed set.
    #[error("role {actual} is not permitted here (requires {required})")]
    Forbidden {
        /// Description of the allowed set.
        required: &'static str,
        /// The caller's actual role.
        actual: Role,
    },

    /// Login failed. Unknown email and wrong password are deliberately
    /// indistinguishable.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Registration input failed validation.
    #[error("validation error: {0}")]
    Validation(String),

    /// The email is already registered.
    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    /// The principal directory failed.
    #[error("directory error: {0}")]
    Directory(String),

    /// Token claims could not be encoded.
    #[error("token encoding failed: {0}")]
    Encoding(String),
}

impl AuthError {
    /// Whether this error means the caller should re-authenticate
    /// (as opposed to being authenticated but not allowed).
    pub fn requires_login(&self) -> bool {
        matches!(
            self,
            Self::Unauthenticated | Self::Malformed | Self::InvalidSignature | Self::Expired
        )
    }
}
