//! # Fulfillment Error Taxonomy
//!
//! Every failed precondition check is a distinguishable kind, raised at the
//! point of detection and surfaced directly — the core never retries. Only
//! [`FulfillmentError::ProofUpload`] is caller-retryable: the invoice is
//! guaranteed to still be PENDING when it is returned.

use thiserror::Error;

use frex_core::{InvoiceId, ShipmentId};
use frex_store::StoreError;

/// Why a transition was refused: the entity is not in the required
/// precondition state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// The invoice already has a terminal resolution.
    AlreadyResolved,
    /// The shipment is already finalized.
    AlreadyFinalized,
    /// Manual finish requested while invoices are still pending.
    InvoicesPending {
        /// How many invoices are still pending.
        pending: usize,
    },
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyResolved => f.write_str("invoice already resolved"),
            Self::AlreadyFinalized => f.write_str("shipment already finalized"),
            Self::InvoicesPending { pending } => {
                write!(f, "{pending} invoice(s) still pending")
            }
        }
    }
}

/// Errors from the fulfillment engines.
#[derive(Error, Debug)]
pub enum FulfillmentError {
    /// Missing or malformed input; the caller must correct and resubmit.
    #[error("validation error: {0}")]
    Validation(String),

    /// Unknown shipment id.
    #[error("shipment not found: {0}")]
    ShipmentNotFound(ShipmentId),

    /// Unknown invoice id.
    #[error("invoice not found: {0}")]
    InvoiceNotFound(InvoiceId),

    /// Valid identity, but not permitted on this entity (wrong owner or
    /// wrong role).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Attempted transition on an entity not in the required precondition
    /// state.
    #[error("conflict: {0}")]
    Conflict(ConflictKind),

    /// Proof upload failed; the invoice is still PENDING and the call may
    /// be retried.
    #[error("proof upload failed: {0}")]
    ProofUpload(String),

    /// Storage collaborator failure.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}
