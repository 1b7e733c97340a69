//! Repository traits and the conditional-update result type.

use frex_core::{DriverId, InvoiceId, ShipmentId, Timestamp};
use frex_state::{Invoice, InvoiceResolution, Shipment};

use crate::error::StoreResult;

/// Outcome of a conditional update.
///
/// `Applied` carries the entity after the write; `Unchanged` carries the
/// entity as it already was — the precondition did not hold, zero rows were
/// affected, and nothing was overwritten. Callers decide whether
/// `Unchanged` is a `Conflict` (invoice resolution, manual finish) or
/// benign (the automatic evaluator racing another finalizer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Conditional<T> {
    /// The precondition held; the write was performed.
    Applied(T),
    /// The precondition did not hold; state is untouched.
    Unchanged(T),
}

impl<T> Conditional<T> {
    /// Whether the write was performed.
    pub fn was_applied(&self) -> bool {
        matches!(self, Self::Applied(_))
    }

    /// The entity, regardless of outcome.
    pub fn into_inner(self) -> T {
        match self {
            Self::Applied(v) | Self::Unchanged(v) => v,
        }
    }
}

/// Shipment persistence.
///
/// All implementations must satisfy these invariants:
/// - `insert_shipment_with_invoices` is all-or-nothing and fails on an
///   unknown driver.
/// - `finalize_if_pending` performs the PENDING→FINALIZED transition
///   atomically with its precondition check; two concurrent calls see
///   exactly one `Applied`.
pub trait ShipmentStore: Send + Sync {
    /// Atomically persist a new shipment and its full invoice set.
    ///
    /// Fails with `StoreError::UnknownDriver` (writing nothing) if the
    /// assigned driver is not a registered driver.
    fn insert_shipment_with_invoices(
        &self,
        shipment: Shipment,
        invoices: Vec<Invoice>,
    ) -> StoreResult<()>;

    /// Read a shipment by id. `Ok(None)` if absent.
    fn shipment(&self, id: ShipmentId) -> StoreResult<Option<Shipment>>;

    /// All shipments assigned to `driver`, newest first.
    fn shipments_for_driver(&self, driver: DriverId) -> StoreResult<Vec<Shipment>>;

    /// Every shipment with its owned invoices, newest first. Read-only
    /// history aggregation; not part of the state machine.
    fn shipments_with_invoices(&self) -> StoreResult<Vec<(Shipment, Vec<Invoice>)>>;

    /// Conditionally transition PENDING→FINALIZED, setting `finished_at = at`.
    ///
    /// `Unchanged` means the shipment was already finalized. Unknown ids
    /// fail with `StoreError::MissingShipment`.
    fn finalize_if_pending(
        &self,
        id: ShipmentId,
        at: Timestamp,
    ) -> StoreResult<Conditional<Shipment>>;
}

/// Invoice persistence.
pub trait InvoiceStore: Send + Sync {
    /// Read an invoice by id. `Ok(None)` if absent.
    fn invoice(&self, id: InvoiceId) -> StoreResult<Option<Invoice>>;

    /// All invoices owned by `shipment`, in insertion order.
    fn invoices_for_shipment(&self, shipment: ShipmentId) -> StoreResult<Vec<Invoice>>;

    /// Conditionally apply a terminal resolution where status = PENDING,
    /// setting `completed_at = at`.
    ///
    /// `Unchanged` means a concurrent (or earlier) resolution won; the
    /// stored outcome is returned untouched. Unknown ids fail with
    /// `StoreError::MissingInvoice`.
    fn resolve_if_pending(
        &self,
        id: InvoiceId,
        resolution: InvoiceResolution,
        at: Timestamp,
    ) -> StoreResult<Conditional<Invoice>>;
}
