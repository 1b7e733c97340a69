//! # frex-fulfillment — The Fulfillment Engines
//!
//! The orchestration layer between the state machines (`frex-state`) and
//! the repositories (`frex-store`). Three engines, mirroring the three
//! write paths of the platform:
//!
//! - [`ShipmentRegistry`] — admin-triggered, all-or-nothing creation of a
//!   shipment and its invoice set.
//! - [`InvoiceResolutionEngine`] — driver-constrained resolution of a
//!   single invoice as delivered or divergent, including the
//!   upload-before-commit proof flow.
//! - [`ShipmentCompletionEvaluator`] — derives the shipment status from
//!   its invoices after every resolution, and serves the explicit
//!   manual-finish operation through the same conditional transition.
//!
//! ## Concurrency
//!
//! Every transition goes through the store's conditional-update primitive.
//! The engines never read-then-write without the store re-checking the
//! precondition under its own atomicity, so concurrent resolutions of the
//! same invoice, and concurrent automatic/manual finalizations of the same
//! shipment, each apply exactly once. The loser gets a deterministic
//! `Conflict`, never a silent no-op and never a double side effect.

pub mod completion;
pub mod error;
pub mod proof;
pub mod registry;
pub mod resolution;

// Re-export primary types for ergonomic imports.
pub use completion::{CompletionOutcome, ShipmentCompletionEvaluator};
pub use error::{ConflictKind, FulfillmentError};
pub use proof::{InMemoryProofStore, ProofError, ProofStore, ProofUpload};
pub use registry::{NewShipment, ShipmentRegistry};
pub use resolution::InvoiceResolutionEngine;
