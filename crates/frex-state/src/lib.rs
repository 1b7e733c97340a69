//! # frex-state — Delivery Fulfillment State Machines
//!
//! Implements the two state machines at the heart of the FREX platform.
//! Each transition is a method that validates the current state and rejects
//! anything but the single allowed move with a structured error.
//!
//! ## State Machines
//!
//! - **Invoice** (`invoice.rs`): `PENDING → DELIVERED` or
//!   `PENDING → DIVERGENT`. Both targets are terminal. A delivered invoice
//!   carries a proof-of-delivery reference; a divergent invoice carries a
//!   categorized issue type and free-text details.
//!
//! - **Shipment** (`shipment.rs`): `PENDING → FINALIZED`, terminal.
//!   A shipment's status is a pure function of its invoices' statuses:
//!   it is FINALIZED exactly when every owned invoice is terminal.
//!
//! ```text
//! Shipment:  PENDING --(all invoices terminal)--> FINALIZED   [terminal]
//! Invoice:   PENDING --(resolve delivered)------> DELIVERED   [terminal]
//!            PENDING --(resolve divergent)------> DIVERGENT   [terminal]
//! ```
//!
//! ## Design
//!
//! Transitions mutate the record in place and return `Result`, so the store
//! can run them under its write lock: "apply this transition where the
//! current status still permits it" is the conditional-update primitive the
//! concurrency model relies on. There is no way to re-resolve an invoice or
//! re-finalize a shipment — the methods reject it, and there are no setters
//! that bypass them.

pub mod invoice;
pub mod shipment;

// ─── Invoice re-exports ──────────────────────────────────────────────

pub use invoice::{Invoice, InvoiceError, InvoiceResolution, InvoiceStatus, IssueType};

// ─── Shipment re-exports ─────────────────────────────────────────────

pub use shipment::{derived_status, Shipment, ShipmentError, ShipmentStatus};
