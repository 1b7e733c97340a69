//! # Shipment Registry — Atomic Shipment + Invoice Creation
//!
//! Admin-triggered creation of one shipment and its full invoice set. The
//! operation is all-or-nothing: either the shipment and every invoice are
//! committed together or nothing is. The registry validates the input; the
//! referential check of the assigned driver is the store's job, and a
//! store-reported unknown driver fails the whole creation.

use std::collections::HashSet;
use std::sync::Arc;

use frex_core::DriverId;
use frex_state::{Invoice, Shipment};
use frex_store::{ShipmentStore, StoreError};

use crate::error::FulfillmentError;

/// Input for shipment creation.
#[derive(Debug, Clone)]
pub struct NewShipment {
    /// Human-readable shipment name.
    pub name: String,
    /// Delivery destination.
    pub destination: String,
    /// Free-text description of the load. May be empty.
    pub description: String,
    /// The driver to assign.
    pub driver_id: DriverId,
    /// Fiscal invoice numbers, one invoice created per entry. Must be
    /// non-empty, with no blank entries and no duplicates.
    pub invoice_numbers: Vec<String>,
}

/// Creates shipments and their invoice sets.
pub struct ShipmentRegistry {
    shipments: Arc<dyn ShipmentStore>,
}

impl ShipmentRegistry {
    /// Create a registry over the given store.
    pub fn new(shipments: Arc<dyn ShipmentStore>) -> Self {
        Self { shipments }
    }

    /// Validate and atomically create a PENDING shipment plus one PENDING
    /// invoice per invoice number.
    ///
    /// # Errors
    ///
    /// - [`FulfillmentError::Validation`] — blank name/destination, empty
    ///   invoice list, blank or duplicate invoice numbers, or a driver id
    ///   the store does not recognize.
    /// - [`FulfillmentError::Store`] — backend failure; nothing was written.
    pub fn create(&self, input: NewShipment) -> Result<(Shipment, Vec<Invoice>), FulfillmentError> {
        validate(&input)?;

        let shipment = Shipment::new(
            input.name.trim(),
            input.destination.trim(),
            input.description.trim(),
            input.driver_id,
        );
        let invoices: Vec<Invoice> = input
            .invoice_numbers
            .iter()
            .map(|number| Invoice::new(shipment.id, number.trim()))
            .collect();

        match self
            .shipments
            .insert_shipment_with_invoices(shipment.clone(), invoices.clone())
        {
            Ok(()) => {
                tracing::info!(
                    shipment = %shipment.id,
                    driver = %shipment.driver_id,
                    invoices = invoices.len(),
                    "created shipment"
                );
                Ok((shipment, invoices))
            }
            Err(StoreError::UnknownDriver(driver)) => Err(FulfillmentError::Validation(format!(
                "unknown driver: {driver}"
            ))),
            Err(other) => Err(other.into()),
        }
    }
}

fn validate(input: &NewShipment) -> Result<(), FulfillmentError> {
    if input.name.trim().is_empty() {
        return Err(FulfillmentError::Validation(
            "name must not be empty".to_string(),
        ));
    }
    if input.destination.trim().is_empty() {
        return Err(FulfillmentError::Validation(
            "destination must not be empty".to_string(),
        ));
    }
    if input.invoice_numbers.is_empty() {
        return Err(FulfillmentError::Validation(
            "at least one invoice number is required".to_string(),
        ));
    }
    let mut seen = HashSet::new();
    for number in &input.invoice_numbers {
        let trimmed = number.trim();
        if trimmed.is_empty() {
            return Err(FulfillmentError::Validation(
                "invoice numbers must not be blank".to_string(),
            ));
        }
        if !seen.insert(trimmed) {
            return Err(FulfillmentError::Validation(format!(
                "duplicate invoice number: {trimmed}"
            )));
        }
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────
