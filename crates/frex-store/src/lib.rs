//! # frex-store — Repositories with Conditional Updates
//!
//! The persistence seam of the FREX platform. The persistent-storage engine
//! itself is an external collaborator; the core requires exactly one
//! primitive from it: the **conditional update** — a write that succeeds
//! only if a precondition on current state still holds ("set status to X
//! where status = PENDING"), reporting whether it was applied.
//!
//! # Traits
//!
//! One method set per entity, all `Send + Sync`, injected into the engines:
//!
//! - [`ShipmentStore`] — atomic shipment+invoices creation, lookups, and
//!   the conditional PENDING→FINALIZED transition.
//! - [`InvoiceStore`] — lookups and the conditional PENDING→terminal
//!   resolution.
//! - `PrincipalDirectory` (defined in `frex-auth`) — principal storage with
//!   unique emails.
//!
//! # Backends
//!
//! - [`InMemoryStore`] — `RwLock<HashMap>`-based reference implementation
//!   for tests and embedding. Read-modify-write under the write lock gives
//!   the same atomicity a database's `UPDATE ... WHERE status = 'PENDING'`
//!   would.
//!
//! # Design Rules
//!
//! 1. Conditional transitions report [`Conditional::Unchanged`] instead of
//!    silently overwriting — the engines turn that into `Conflict`.
//! 2. Shipment+invoices creation is all-or-nothing, and fails on an unknown
//!    driver (the referential check is the store's job).
//! 3. Entities are never deleted.
//! 4. All backend errors are propagated, never silently ignored.

pub mod error;
pub mod memory;
pub mod traits;

// Re-export primary types at crate root for ergonomic imports.
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryStore;
pub use traits::{Conditional, InvoiceStore, ShipmentStore};
