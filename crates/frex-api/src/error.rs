//! # API Error Types
//!
//! Structured error type implementing `axum::response::IntoResponse`.
//! Maps domain errors from frex-auth and frex-fulfillment to HTTP status
//! codes. Returns JSON error bodies with a machine-readable code and a
//! human-readable message. Internal error details are never exposed to
//! clients.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use frex_auth::AuthError;
use frex_fulfillment::FulfillmentError;

/// Structured JSON error response body.
///
/// All error responses use this format across the API surface.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: ErrorDetail,
}

/// Inner error detail.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code (e.g., "NOT_FOUND", "VALIDATION_ERROR").
    pub code: String,
    /// Human-readable error message.
    pub message: String,
}

/// Application-level error type that implements [`IntoResponse`] for Axum.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (404).
    #[error("not found: {0}")]
    NotFound(String),

    /// Request validation failed (422). Both JSON deserialization failures
    /// and business-rule violations land here — only malformed HTTP framing
    /// is 400, and Axum produces that before a handler runs.
    #[error("validation error: {0}")]
    Validation(String),

    /// Authentication failure — missing, malformed, unverifiable, or
    /// expired token, or bad login credentials (401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Authorization failure — authenticated but not permitted (403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Conflict with current resource state (409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Internal server error (500). Message is logged but not returned to
    /// the client.
    #[error("internal error: {0}")]
    Internal(String),

    /// A required collaborator (proof object store) failed; the operation
    /// may be retried (503).
    #[error("service unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// The HTTP status code and machine-readable error code for this error.
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            Self::NotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            Self::Validation(_) => (StatusCode::UNPROCESSABLE_ENTITY, "VALIDATION_ERROR"),
            Self::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED"),
            Self::Forbidden(_) => (StatusCode::FORBIDDEN, "FORBIDDEN"),
            Self::Conflict(_) => (StatusCode::CONFLICT, "CONFLICT"),
            Self::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
            Self::ServiceUnavailable(_) => (StatusCode::SERVICE_UNAVAILABLE, "SERVICE_UNAVAILABLE"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();

        // Never expose internal error messages to clients.
        let message = match &self {
            Self::Internal(_) => "An internal error occurred".to_string(),
            other => other.to_string(),
        };

        // Log server-side errors for operator visibility.
        match &self {
            Self::Internal(_) => tracing::error!(error = %self, "internal server error"),
            Self::ServiceUnavailable(_) => tracing::warn!(error = %self, "service unavailable"),
            _ => {}
        }

        let body = ErrorBody {
            error: ErrorDetail {
                code: code.to_string(),
                message,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        match &err {
            AuthError::Unauthenticated
            | AuthError::Malformed
            | AuthError::InvalidSignature
            | AuthError::Expired
            | AuthError::InvalidCredentials => Self::Unauthorized(err.to_string()),
            AuthError::Forbidden { .. } => Self::Forbidden(err.to_string()),
            AuthError::Validation(_) => Self::Validation(err.to_string()),
            AuthError::DuplicateEmail(_) => Self::Conflict(err.to_string()),
            AuthError::Directory(_) | AuthError::Encoding(_) => Self::Internal(err.to_string()),
        }
    }
}

impl From<FulfillmentError> for AppError {
    fn from(err: FulfillmentError) -> Self {
        match &err {
            FulfillmentError::Validation(_) => Self::Validation(err.to_string()),
            FulfillmentError::ShipmentNotFound(_) | FulfillmentError::InvoiceNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            FulfillmentError::Forbidden(_) => Self::Forbidden(err.to_string()),
            FulfillmentError::Conflict(_) => Self::Conflict(err.to_string()),
            FulfillmentError::ProofUpload(_) => Self::ServiceUnavailable(err.to_string()),
            FulfillmentError::Store(_) => Self::Internal(err.to_string()),
        }
    }
}
