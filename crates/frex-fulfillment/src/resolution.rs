//! # Invoice Resolution Engine
//!
//! Records the terminal outcome of a single invoice — delivered or
//! divergent — under the identity of the acting driver. Only the driver the
//! parent shipment is assigned to may resolve its invoices.
//!
//! ## Precondition order
//!
//! 1. Invoice exists (`NotFound`).
//! 2. Invoice still PENDING (`Conflict: AlreadyResolved`).
//! 3. Acting driver owns the parent shipment (`Forbidden`).
//! 4. Payload is valid: non-empty proof reference / known issue type with
//!    non-empty details (`ValidationError`).
//!
//! The pre-checks give accurate errors and keep side effects (proof upload)
//! off already-resolved invoices; the store's conditional write has the
//! final word under concurrency, so a lost race still surfaces as
//! `Conflict`, never as a silent overwrite.
//!
//! After every applied resolution the engine invokes the
//! [`ShipmentCompletionEvaluator`] for the parent shipment.

use std::sync::Arc;

use frex_core::{DriverId, InvoiceId};
use frex_state::{Invoice, InvoiceResolution, IssueType};
use frex_store::{Conditional, InvoiceStore, ShipmentStore, StoreError};

use crate::completion::ShipmentCompletionEvaluator;
use crate::error::{ConflictKind, FulfillmentError};
use crate::proof::{ProofStore, ProofUpload};

/// Resolves invoices under driver identity.
pub struct InvoiceResolutionEngine {
    invoices: Arc<dyn InvoiceStore>,
    shipments: Arc<dyn ShipmentStore>,
    evaluator: Arc<ShipmentCompletionEvaluator>,
}

impl InvoiceResolutionEngine {
    /// Create an engine over the given stores and evaluator.
    pub fn new(
        invoices: Arc<dyn InvoiceStore>,
        shipments: Arc<dyn ShipmentStore>,
        evaluator: Arc<ShipmentCompletionEvaluator>,
    ) -> Self {
        Self {
            invoices,
            shipments,
            evaluator,
        }
    }

    /// Resolve an invoice as DELIVERED with an already-stored proof
    /// reference.
    pub fn resolve_delivered(
        &self,
        invoice_id: InvoiceId,
        acting_driver: DriverId,
        proof_ref: &str,
    ) -> Result<Invoice, FulfillmentError> {
        self.check_preconditions(invoice_id, acting_driver)?;
        if proof_ref.trim().is_empty() {
            return Err(FulfillmentError::Validation(
                "proof reference must not be empty".to_string(),
            ));
        }
        self.commit(
            invoice_id,
            InvoiceResolution::Delivered {
                proof_ref: proof_ref.trim().to_string(),
            },
        )
    }

    /// Resolve an invoice as DIVERGENT with a categorized issue.
    pub fn resolve_divergent(
        &self,
        invoice_id: InvoiceId,
        acting_driver: DriverId,
        issue_type: IssueType,
        issue_details: &str,
    ) -> Result<Invoice, FulfillmentError> {
        self.check_preconditions(invoice_id, acting_driver)?;
        if issue_details.trim().is_empty() {
            return Err(FulfillmentError::Validation(
                "issue details must not be empty".to_string(),
            ));
        }
        self.commit(
            invoice_id,
            InvoiceResolution::Divergent {
                issue_type,
                issue_details: issue_details.trim().to_string(),
            },
        )
    }

    /// Upload a proof payload and resolve the invoice as DELIVERED with the
    /// returned reference.
    ///
    /// The upload happens only after the existence/status/ownership checks
    /// pass, so a proof is never uploaded against an already-resolved
    /// invoice. If the upload fails, the invoice is still PENDING and the
    /// call may be retried.
    pub fn deliver_with_proof(
        &self,
        invoice_id: InvoiceId,
        acting_driver: DriverId,
        upload: ProofUpload,
        proofs: &dyn ProofStore,
    ) -> Result<Invoice, FulfillmentError> {
        self.check_preconditions(invoice_id, acting_driver)?;

        // Blocking upload; must complete before the transition commits.
        let proof_ref = proofs
            .put(upload)
            .map_err(|e| FulfillmentError::ProofUpload(e.to_string()))?;
        tracing::debug!(invoice = %invoice_id, proof_ref = %proof_ref, "proof stored");

        self.commit(invoice_id, InvoiceResolution::Delivered { proof_ref })
    }

    /// Existence, status, and ownership checks shared by every resolution
    /// path.
    fn check_preconditions(
        &self,
        invoice_id: InvoiceId,
        acting_driver: DriverId,
    ) -> Result<(), FulfillmentError> {
        let invoice = self
            .invoices
            .invoice(invoice_id)?
            .ok_or(FulfillmentError::InvoiceNotFound(invoice_id))?;
        if invoice.is_resolved() {
            return Err(FulfillmentError::Conflict(ConflictKind::AlreadyResolved));
        }

        // The parent shipment must exist — invoices cannot outlive their
        // shipment, so a miss here is a store integrity failure.
        let shipment = self.shipments.shipment(invoice.shipment_id)?.ok_or_else(|| {
            FulfillmentError::Store(StoreError::Backend(format!(
                "invoice {invoice_id} references missing shipment {}",
                invoice.shipment_id
            )))
        })?;
        if shipment.driver_id != acting_driver {
            return Err(FulfillmentError::Forbidden(
                "invoice belongs to another driver's shipment".to_string(),
            ));
        }
        Ok(())
    }

    /// Conditional write plus the follow-up shipment evaluation.
    fn commit(
        &self,
        invoice_id: InvoiceId,
        resolution: InvoiceResolution,
    ) -> Result<Invoice, FulfillmentError> {
        let invoice = match self.invoices.resolve_if_pending(
            invoice_id,
            resolution,
            frex_core::Timestamp::now(),
        )? {
            Conditional::Applied(invoice) => invoice,
            // A concurrent resolution won between our pre-check and the
            // write; deterministic conflict, nothing overwritten.
            Conditional::Unchanged(_) => {
                return Err(FulfillmentError::Conflict(ConflictKind::AlreadyResolved));
            }
        };
        tracing::info!(
            invoice = %invoice.id,
            shipment = %invoice.shipment_id,
            status = %invoice.status,
            "invoice resolved"
        );

        self.evaluator
            .evaluate_after_resolution(invoice.shipment_id)?;
        Ok(invoice)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────
