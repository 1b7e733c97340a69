//! In-memory, `RwLock<HashMap>`-based reference store.
//!
//! Intended for tests and embedding. Each conditional transition runs as a
//! read-modify-write under the write lock, which is exactly the atomicity
//! the trait contracts require: at most one concurrent caller observes the
//! precondition as true.
//!
//! Lock ordering is fixed (principals → shipments → invoices) for the one
//! operation that takes more than one lock.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use frex_auth::{DirectoryError, Principal, PrincipalDirectory};
use frex_core::{DriverId, InvoiceId, PrincipalId, Role, ShipmentId, Timestamp};
use frex_state::{Invoice, InvoiceError, InvoiceResolution, Shipment};

use crate::error::{StoreError, StoreResult};
use crate::traits::{Conditional, InvoiceStore, ShipmentStore};

#[derive(Debug, Clone)]
struct Sequenced<T> {
    seq: u64,
    record: T,
}

/// In-memory store implementing every repository trait.
#[derive(Default)]
pub struct InMemoryStore {
    principals: RwLock<HashMap<PrincipalId, Principal>>,
    shipments: RwLock<HashMap<ShipmentId, Sequenced<Shipment>>>,
    invoices: RwLock<HashMap<InvoiceId, Sequenced<Invoice>>>,
    seq: AtomicU64,
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of shipments currently stored.
    pub fn shipment_count(&self) -> usize {
        self.shipments.read().expect("lock poisoned").len()
    }

    /// Number of invoices currently stored.
    pub fn invoice_count(&self) -> usize {
        self.invoices.read().expect("lock poisoned").len()
    }

    fn next_seq(&self) -> u64 {
        self.seq.fetch_add(1, Ordering::Relaxed)
    }
}

// ─── PrincipalDirectory ──────────────────────────────────────────────

impl PrincipalDirectory for InMemoryStore {
    fn insert(&self, principal: Principal) -> Result<(), DirectoryError> {
        let mut map = self.principals.write().expect("lock poisoned");
        if map.values().any(|p| p.email == principal.email) {
            return Err(DirectoryError::DuplicateEmail(principal.email));
        }
        map.insert(principal.id, principal);
        Ok(())
    }

    fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DirectoryError> {
        let map = self.principals.read().expect("lock poisoned");
        Ok(map.values().find(|p| p.email == email).cloned())
    }

    fn principal(&self, id: PrincipalId) -> Result<Option<Principal>, DirectoryError> {
        let map = self.principals.read().expect("lock poisoned");
        Ok(map.get(&id).cloned())
    }

    fn drivers(&self) -> Result<Vec<Principal>, DirectoryError> {
        let map = self.principals.read().expect("lock poisoned");
        let mut drivers: Vec<Principal> = map
            .values()
            .filter(|p| p.role == Role::Driver)
            .cloned()
            .collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drivers)
    }
}

// ─── ShipmentStore ───────────────────────────────────────────────────

impl ShipmentStore for InMemoryStore {
    fn insert_shipment_with_invoices(
        &self,
        shipment: Shipment,
        invoices: Vec<Invoice>,
    ) -> StoreResult<()> {
        // Referential check first: the whole creation fails on an unknown
        // driver, and nothing is written.
        {
            let principals = self.principals.read().expect("lock poisoned");
            let driver_known = principals
                .get(&shipment.driver_id.as_principal())
                .is_some_and(|p| p.role == Role::Driver);
            if !driver_known {
                return Err(StoreError::UnknownDriver(shipment.driver_id));
            }
        }

        let mut shipments = self.shipments.write().expect("lock poisoned");
        let mut invoice_map = self.invoices.write().expect("lock poisoned");

        let shipment_id = shipment.id;
        shipments.insert(
            shipment_id,
            Sequenced {
                seq: self.next_seq(),
                record: shipment,
            },
        );
        for invoice in invoices {
            debug_assert_eq!(invoice.shipment_id, shipment_id);
            invoice_map.insert(
                invoice.id,
                Sequenced {
                    seq: self.next_seq(),
                    record: invoice,
                },
            );
        }
        Ok(())
    }

    fn shipment(&self, id: ShipmentId) -> StoreResult<Option<Shipment>> {
        let map = self.shipments.read().expect("lock poisoned");
        Ok(map.get(&id).map(|s| s.record.clone()))
    }

    fn shipments_for_driver(&self, driver: DriverId) -> StoreResult<Vec<Shipment>> {
        let map = self.shipments.read().expect("lock poisoned");
        let mut rows: Vec<&Sequenced<Shipment>> =
            map.values().filter(|s| s.record.driver_id == driver).collect();
        rows.sort_by(|a, b| b.seq.cmp(&a.seq));
        Ok(rows.into_iter().map(|s| s.record.clone()).collect())
    }

    fn shipments_with_invoices(&self) -> StoreResult<Vec<(Shipment, Vec<Invoice>)>> {
        let shipments = self.shipments.read().expect("lock poisoned");
        let invoices = self.invoices.read().expect("lock poisoned");

        let mut rows: Vec<&Sequenced<Shipment>> = shipments.values().collect();
        rows.sort_by(|a, b| b.seq.cmp(&a.seq));

        Ok(rows
            .into_iter()
            .map(|s| {
                let mut owned: Vec<&Sequenced<Invoice>> = invoices
                    .values()
                    .filter(|i| i.record.shipment_id == s.record.id)
                    .collect();
                owned.sort_by(|a, b| a.seq.cmp(&b.seq));
                (
                    s.record.clone(),
                    owned.into_iter().map(|i| i.record.clone()).collect(),
                )
            })
            .collect())
    }

    fn finalize_if_pending(
        &self,
        id: ShipmentId,
        at: Timestamp,
    ) -> StoreResult<Conditional<Shipment>> {
        let mut map = self.shipments.write().expect("lock poisoned");
        let entry = map.get_mut(&id).ok_or(StoreError::MissingShipment(id))?;
        match entry.record.finalize(at) {
            Ok(()) => Ok(Conditional::Applied(entry.record.clone())),
            Err(_) => Ok(Conditional::Unchanged(entry.record.clone())),
        }
    }
}

// ─── InvoiceStore ────────────────────────────────────────────────────

impl InvoiceStore for InMemoryStore {
    fn invoice(&self, id: InvoiceId) -> StoreResult<Option<Invoice>> {
        let map = self.invoices.read().expect("lock poisoned");
        Ok(map.get(&id).map(|i| i.record.clone()))
    }

    fn invoices_for_shipment(&self, shipment: ShipmentId) -> StoreResult<Vec<Invoice>> {
        let map = self.invoices.read().expect("lock poisoned");
        let mut rows: Vec<&Sequenced<Invoice>> = map
            .values()
            .filter(|i| i.record.shipment_id == shipment)
            .collect();
        rows.sort_by(|a, b| a.seq.cmp(&b.seq));
        Ok(rows.into_iter().map(|i| i.record.clone()).collect())
    }

    fn resolve_if_pending(
        &self,
        id: InvoiceId,
        resolution: InvoiceResolution,
        at: Timestamp,
    ) -> StoreResult<Conditional<Invoice>> {
        let mut map = self.invoices.write().expect("lock poisoned");
        let entry = map.get_mut(&id).ok_or(StoreError::MissingInvoice(id))?;
        match entry.record.resolve(resolution, at) {
            Ok(()) => Ok(Conditional::Applied(entry.record.clone())),
            Err(InvoiceError::AlreadyResolved { .. }) => {
                Ok(Conditional::Unchanged(entry.record.clone()))
            }
            // Payload validation failures are the engine's to catch before
            // the write; surfacing them here keeps the store honest.
            Err(other) => Err(StoreError::InvalidWrite(other.to_string())),
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
