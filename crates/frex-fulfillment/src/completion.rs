//! # Shipment Completion Evaluator
//!
//! The single place where shipments transition PENDING→FINALIZED. Two
//! invocation paths converge here — the automatic evaluation after every
//! invoice resolution and the explicit manual-finish operation — and both
//! end in the same conditional write, so there is exactly one copy of the
//! completion logic.
//!
//! The conditional write ("finalize where status = PENDING") makes
//! concurrent evaluations safe: when the automatic evaluator triggered by
//! the last resolution races a manual-finish call, exactly one observes the
//! precondition as true, and `finished_at` is set exactly once.

use std::sync::Arc;

use frex_auth::AuthContext;
use frex_core::{ShipmentId, Timestamp};
use frex_state::{derived_status, Shipment, ShipmentStatus};
use frex_store::{Conditional, InvoiceStore, ShipmentStore};

use crate::error::{ConflictKind, FulfillmentError};

/// What an automatic evaluation concluded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompletionOutcome {
    /// Every invoice is terminal; this call performed the finalization.
    Finalized(Shipment),
    /// At least one invoice is still pending; nothing was written.
    StillPending {
        /// How many invoices are still pending.
        pending: usize,
    },
    /// Every invoice is terminal but a concurrent caller finalized first.
    /// Benign on the automatic path.
    AlreadyFinalized(Shipment),
}

/// Aggregates invoice states to decide shipment finalization.
pub struct ShipmentCompletionEvaluator {
    shipments: Arc<dyn ShipmentStore>,
    invoices: Arc<dyn InvoiceStore>,
}

impl ShipmentCompletionEvaluator {
    /// Create an evaluator over the given stores.
    pub fn new(shipments: Arc<dyn ShipmentStore>, invoices: Arc<dyn InvoiceStore>) -> Self {
        Self {
            shipments,
            invoices,
        }
    }

    /// Evaluate a shipment after one of its invoices was resolved.
    ///
    /// No-op while any invoice is PENDING. Once all are terminal, performs
    /// the conditional PENDING→FINALIZED transition; losing the race to a
    /// concurrent finalizer is reported as
    /// [`CompletionOutcome::AlreadyFinalized`], not an error.
    pub fn evaluate_after_resolution(
        &self,
        shipment_id: ShipmentId,
    ) -> Result<CompletionOutcome, FulfillmentError> {
        let invoices = self.invoices.invoices_for_shipment(shipment_id)?;
        if derived_status(&invoices) != ShipmentStatus::Finalized {
            let pending = invoices.iter().filter(|i| !i.is_resolved()).count();
            return Ok(CompletionOutcome::StillPending { pending });
        }

        match self
            .shipments
            .finalize_if_pending(shipment_id, Timestamp::now())?
        {
            Conditional::Applied(shipment) => {
                tracing::info!(shipment = %shipment.id, "shipment finalized");
                Ok(CompletionOutcome::Finalized(shipment))
            }
            Conditional::Unchanged(shipment) => Ok(CompletionOutcome::AlreadyFinalized(shipment)),
        }
    }

    /// Explicit driver/admin-triggered completion.
    ///
    /// # Errors
    ///
    /// - [`FulfillmentError::ShipmentNotFound`] — unknown shipment.
    /// - [`FulfillmentError::Forbidden`] — caller is neither the owning
    ///   driver nor an admin.
    /// - `Conflict: InvoicesPending` — at least one invoice is PENDING.
    /// - `Conflict: AlreadyFinalized` — the shipment is already finalized,
    ///   including losing the race to the automatic evaluator.
    pub fn finish_manually(
        &self,
        shipment_id: ShipmentId,
        ctx: &AuthContext,
    ) -> Result<Shipment, FulfillmentError> {
        let shipment = self
            .shipments
            .shipment(shipment_id)?
            .ok_or(FulfillmentError::ShipmentNotFound(shipment_id))?;

        let is_owner = ctx.driver_id() == Some(shipment.driver_id);
        if !is_owner && !ctx.is_admin() {
            return Err(FulfillmentError::Forbidden(
                "only the assigned driver or an admin may finish a shipment".to_string(),
            ));
        }

        let invoices = self.invoices.invoices_for_shipment(shipment_id)?;
        let pending = invoices.iter().filter(|i| !i.is_resolved()).count();
        if pending > 0 {
            return Err(FulfillmentError::Conflict(ConflictKind::InvoicesPending {
                pending,
            }));
        }

        match self
            .shipments
            .finalize_if_pending(shipment_id, Timestamp::now())?
        {
            Conditional::Applied(shipment) => {
                tracing::info!(
                    shipment = %shipment.id,
                    principal = %ctx.principal_id,
                    "shipment finished manually"
                );
                Ok(shipment)
            }
            Conditional::Unchanged(_) => {
                Err(FulfillmentError::Conflict(ConflictKind::AlreadyFinalized))
            }
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    use frex_auth::{CredentialHash, Principal, PrincipalDirectory};
    use frex_core::{DriverId, PrincipalId, Role};
    use frex_state::{Invoice, InvoiceResolution, IssueType};
    use frex_store::InMemoryStore;

    struct Fixture {
        store: Arc<InMemoryStore>,
        evaluator: ShipmentCompletionEvaluator,
        shipment: Shipment,
        invoices: Vec<Invoice>,
        driver: DriverId,
    }

    fn fixture(invoice_numbers: &[&str]) -> Fixture {
        let store = Arc::new(InMemoryStore::new());
        let principal = Principal {
            id: PrincipalId::new(),
            role: Role::Driver,
            name: "Davi".to_string(),
            email: "davi@frex.test".to_string(),
            credential: CredentialHash::from_password("pw"),
            transport_company: Some("LogSul".to_string()),
            license_plate: Some("RST-4455".to_string()),
        };
        let driver = principal.id.as_driver();
        store.insert(principal).unwrap();

        let shipment = Shipment::new("Load 3", "Curitiba/PR", "", driver);
        let invoices: Vec<Invoice> = invoice_numbers
            .iter()
            .map(|n| Invoice::new(shipment.id, *n))
            .collect();
        store
            .insert_shipment_with_invoices(shipment.clone(), invoices.clone())
            .unwrap();

        let evaluator =
            ShipmentCompletionEvaluator::new(store.clone(), store.clone());
        Fixture {
            store,
            evaluator,
            shipment,
            invoices,
            driver,
        }
    }

    fn resolve_all(fx: &Fixture) {
        for (n, invoice) in fx.invoices.iter().enumerate() {
            fx.store
                .resolve_if_pending(
                    invoice.id,
                    if n % 2 == 0 {
                        InvoiceResolution::Delivered {
                            proof_ref: format!("proofs/{n}"),
                        }
                    } else {
                        InvoiceResolution::Divergent {
                            issue_type: IssueType::NoOneToReceive,
                            issue_details: "closed for holiday".to_string(),
                        }
                    },
                    Timestamp::now(),
                )
                .unwrap();
        }
    }

    fn driver_ctx(fx: &Fixture) -> AuthContext {
        AuthContext {
            principal_id: fx.driver.as_principal(),
            role: Role::Driver,
        }
    }

    fn admin_ctx() -> AuthContext {
        AuthContext {
            principal_id: PrincipalId::new(),
            role: Role::Admin,
        }
    }

    // ── Automatic path ───────────────────────────────────────────────

    #[test]
    fn test_still_pending_is_a_noop() {
        let fx = fixture(&["NF-1", "NF-2"]);
        let outcome = fx
            .evaluator
            .evaluate_after_resolution(fx.shipment.id)
            .unwrap();
        assert_eq!(outcome, CompletionOutcome::StillPending { pending: 2 });
        let stored = fx.store.shipment(fx.shipment.id).unwrap().unwrap();
        assert!(!stored.is_finalized());
    }

    #[test]
    fn test_all_terminal_finalizes() {
        let fx = fixture(&["NF-1", "NF-2"]);
        resolve_all(&fx);

        let outcome = fx
            .evaluator
            .evaluate_after_resolution(fx.shipment.id)
            .unwrap();
        let CompletionOutcome::Finalized(shipment) = outcome else {
            panic!("expected Finalized, got {outcome:?}");
        };
        assert!(shipment.finished_at.is_some());

        // Second evaluation is benign.
        let outcome = fx
            .evaluator
            .evaluate_after_resolution(fx.shipment.id)
            .unwrap();
        assert!(matches!(outcome, CompletionOutcome::AlreadyFinalized(_)));
    }

    #[test]
    fn test_concurrent_evaluations_finalize_exactly_once() {
        let fx = fixture(&["NF-1", "NF-2"]);
        resolve_all(&fx);

        let evaluator = Arc::new(ShipmentCompletionEvaluator::new(
            fx.store.clone(),
            fx.store.clone(),
        ));
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let evaluator = Arc::clone(&evaluator);
                let shipment_id = fx.shipment.id;
                std::thread::spawn(move || {
                    evaluator.evaluate_after_resolution(shipment_id).unwrap()
                })
            })
            .collect();

        let outcomes: Vec<CompletionOutcome> = handles
            .into_iter()
            .map(|h| h.join().expect("thread panicked"))
            .collect();
        let finalized = outcomes
            .iter()
            .filter(|o| matches!(o, CompletionOutcome::Finalized(_)))
            .count();
        assert_eq!(finalized, 1);
        assert!(outcomes
            .iter()
            .all(|o| !matches!(o, CompletionOutcome::StillPending { .. })));
    }

    // ── Manual path ──────────────────────────────────────────────────

    #[test]
    fn test_manual_finish_with_pending_invoices_conflicts() {
        let fx = fixture(&["NF-1", "NF-2"]);
        let err = fx
            .evaluator
            .finish_manually(fx.shipment.id, &driver_ctx(&fx))
            .unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::Conflict(ConflictKind::InvoicesPending { pending: 2 })
        ));
        // Status unchanged.
        let stored = fx.store.shipment(fx.shipment.id).unwrap().unwrap();
        assert_eq!(stored.status, ShipmentStatus::Pending);
    }

    #[test]
    fn test_manual_finish_by_owner_succeeds() {
        let fx = fixture(&["NF-1"]);
        resolve_all(&fx);
        let shipment = fx
            .evaluator
            .finish_manually(fx.shipment.id, &driver_ctx(&fx))
            .unwrap();
        assert!(shipment.is_finalized());
    }

    #[test]
    fn test_manual_finish_by_admin_succeeds() {
        let fx = fixture(&["NF-1"]);
        resolve_all(&fx);
        let shipment = fx
            .evaluator
            .finish_manually(fx.shipment.id, &admin_ctx())
            .unwrap();
        assert!(shipment.is_finalized());
    }

    #[test]
    fn test_manual_finish_by_foreign_driver_is_forbidden() {
        let fx = fixture(&["NF-1"]);
        resolve_all(&fx);
        let stranger = AuthContext {
            principal_id: PrincipalId::new(),
            role: Role::Driver,
        };
        let err = fx
            .evaluator
            .finish_manually(fx.shipment.id, &stranger)
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::Forbidden(_)));
    }

    #[test]
    fn test_manual_finish_by_viewer_is_forbidden() {
        let fx = fixture(&["NF-1"]);
        resolve_all(&fx);
        let viewer = AuthContext {
            principal_id: PrincipalId::new(),
            role: Role::Viewer,
        };
        let err = fx
            .evaluator
            .finish_manually(fx.shipment.id, &viewer)
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::Forbidden(_)));
    }

    #[test]
    fn test_manual_finish_twice_conflicts() {
        let fx = fixture(&["NF-1"]);
        resolve_all(&fx);
        fx.evaluator
            .finish_manually(fx.shipment.id, &driver_ctx(&fx))
            .unwrap();
        let err = fx
            .evaluator
            .finish_manually(fx.shipment.id, &driver_ctx(&fx))
            .unwrap_err();
        assert!(matches!(
            err,
            FulfillmentError::Conflict(ConflictKind::AlreadyFinalized)
        ));
    }

    #[test]
    fn test_manual_finish_unknown_shipment() {
        let fx = fixture(&["NF-1"]);
        let err = fx
            .evaluator
            .finish_manually(ShipmentId::new(), &admin_ctx())
            .unwrap_err();
        assert!(matches!(err, FulfillmentError::ShipmentNotFound(_)));
    }
}
