//! # Shipment Finalization State Machine
//!
//! A shipment is a grouped delivery assignment for one driver, composed of
//! one or more invoices it exclusively owns. Its lifecycle has exactly one
//! transition:
//!
//! ```text
//! PENDING ──(all owned invoices terminal)──▶ FINALIZED   [terminal]
//! ```
//!
//! The shipment status is a pure function of its invoices' statuses —
//! [`derived_status`] computes it, and both the automatic evaluator and the
//! manual finish operation converge on the same [`Shipment::finalize`]
//! transition. `finished_at` is set exactly once, at FINALIZED entry.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use frex_core::{DriverId, ShipmentId, Timestamp};

use crate::invoice::Invoice;

// ─── Status ──────────────────────────────────────────────────────────

/// The lifecycle status of a shipment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    /// At least one owned invoice is still pending.
    Pending,
    /// Every owned invoice is terminal (DELIVERED or DIVERGENT).
    Finalized,
}

impl ShipmentStatus {
    /// Whether this status is terminal.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Finalized)
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Finalized => "FINALIZED",
        };
        f.write_str(s)
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from shipment transitions.
#[derive(Error, Debug)]
pub enum ShipmentError {
    /// The shipment is already finalized; finalization is terminal.
    #[error("shipment {shipment_id} is already finalized")]
    AlreadyFinalized {
        /// The shipment.
        shipment_id: ShipmentId,
    },
}

// ─── Shipment ────────────────────────────────────────────────────────

/// A grouped delivery assignment for one driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shipment {
    /// Unique shipment identifier.
    pub id: ShipmentId,
    /// Human-readable shipment name.
    pub name: String,
    /// Delivery destination.
    pub destination: String,
    /// Free-text description of the load.
    pub description: String,
    /// The driver assigned to this shipment. Only this driver may resolve
    /// the shipment's invoices.
    pub driver_id: DriverId,
    /// Current lifecycle status.
    pub status: ShipmentStatus,
    /// When the shipment was created.
    pub created_at: Timestamp,
    /// When the shipment was finalized. Set exactly once.
    pub finished_at: Option<Timestamp>,
}

impl Shipment {
    /// Create a new PENDING shipment assigned to `driver_id`.
    pub fn new(
        name: impl Into<String>,
        destination: impl Into<String>,
        description: impl Into<String>,
        driver_id: DriverId,
    ) -> Self {
        Self {
            id: ShipmentId::new(),
            name: name.into(),
            destination: destination.into(),
            description: description.into(),
            driver_id,
            status: ShipmentStatus::Pending,
            created_at: Timestamp::now(),
            finished_at: None,
        }
    }

    /// Finalize the shipment (PENDING → FINALIZED), setting `finished_at`.
    ///
    /// Fails with [`ShipmentError::AlreadyFinalized`] unless the shipment is
    /// still PENDING. Run under the store's write lock this is the
    /// conditional update that makes concurrent evaluator invocations safe:
    /// exactly one observes PENDING and records `finished_at`.
    pub fn finalize(&mut self, at: Timestamp) -> Result<(), ShipmentError> {
        if self.status.is_terminal() {
            return Err(ShipmentError::AlreadyFinalized {
                shipment_id: self.id,
            });
        }
        self.status = ShipmentStatus::Finalized;
        self.finished_at = Some(at);
        Ok(())
    }

    /// Whether the shipment is finalized.
    pub fn is_finalized(&self) -> bool {
        self.status.is_terminal()
    }
}

/// The status a shipment should have given its owned invoices.
///
/// Pure function: FINALIZED exactly when the invoice set is non-empty and
/// every invoice is terminal. The evaluator compares this against the stored
/// status to decide whether to run the conditional finalize.
pub fn derived_status(invoices: &[Invoice]) -> ShipmentStatus {
    if !invoices.is_empty() && invoices.iter().all(Invoice::is_resolved) {
        ShipmentStatus::Finalized
    } else {
        ShipmentStatus::Pending
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
