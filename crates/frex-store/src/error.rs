//! Errors from repository operations.

use frex_core::{DriverId, InvoiceId, ShipmentId};

/// Errors from repository operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Shipment creation referenced a driver the store does not know.
    /// The whole creation fails; nothing is written.
    #[error("unknown driver: {0}")]
    UnknownDriver(DriverId),

    /// A conditional shipment write targeted an unknown shipment.
    #[error("unknown shipment: {0}")]
    MissingShipment(ShipmentId),

    /// A conditional invoice write targeted an unknown invoice.
    #[error("unknown invoice: {0}")]
    MissingInvoice(InvoiceId),

    /// The write payload failed the entity's own validation.
    #[error("invalid write: {0}")]
    InvalidWrite(String),

    /// The storage backend failed.
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
