//! # Invoice Resolution State Machine
//!
//! An invoice is a single proof-of-delivery unit within a shipment. It is
//! created PENDING and resolved exactly once by the assigned driver, either
//! as DELIVERED (with a proof reference) or DIVERGENT (with a categorized
//! issue). Both outcomes are terminal.
//!
//! ## Allowed Transitions
//!
//! ```text
//! PENDING ──resolve(Delivered)──▶ DELIVERED   [terminal]
//! PENDING ──resolve(Divergent)──▶ DIVERGENT   [terminal]
//! ```
//!
//! Any second resolution attempt is rejected with
//! [`InvoiceError::AlreadyResolved`] — never a silent no-op.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use frex_core::{InvoiceId, ShipmentId, Timestamp};

// ─── Status ──────────────────────────────────────────────────────────

/// The resolution status of an invoice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvoiceStatus {
    /// Awaiting driver action.
    Pending,
    /// Delivered as planned, proof reference recorded (terminal).
    Delivered,
    /// Delivery could not be completed as planned (terminal).
    Divergent,
}

impl InvoiceStatus {
    /// Whether this status is terminal (no further transitions allowed).
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Delivered | Self::Divergent)
    }
}

impl std::fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "PENDING",
            Self::Delivered => "DELIVERED",
            Self::Divergent => "DIVERGENT",
        };
        f.write_str(s)
    }
}

// ─── Issue Types ─────────────────────────────────────────────────────

/// The closed enumeration of reasons a delivery can diverge.
///
/// Drawn from the categories drivers report in the field. `Other` is the
/// catch-all; the free-text details field is mandatory for every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    /// Recipient refused to accept the goods.
    RecipientRefused,
    /// No one was present to receive the delivery.
    NoOneToReceive,
    /// The recorded address was wrong.
    WrongAddress,
    /// Goods arrived damaged.
    DamagedGoods,
    /// Delivered quantity did not match the invoice.
    QuantityMismatch,
    /// Arrival outside the recipient's receiving window.
    OutsideDeliveryWindow,
    /// Any other reason, described in the details.
    Other,
}

impl IssueType {
    /// Parse an issue type from its wire form.
    ///
    /// Lenient on case and on spaces/hyphens versus underscores, so
    /// "damaged goods", "Damaged-Goods", and "damaged_goods" all parse to
    /// [`IssueType::DamagedGoods`]. Anything outside the enumeration is
    /// rejected.
    pub fn parse(s: &str) -> Result<Self, InvoiceError> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();
        match normalized.as_str() {
            "recipient_refused" => Ok(Self::RecipientRefused),
            "no_one_to_receive" => Ok(Self::NoOneToReceive),
            "wrong_address" => Ok(Self::WrongAddress),
            "damaged_goods" => Ok(Self::DamagedGoods),
            "quantity_mismatch" => Ok(Self::QuantityMismatch),
            "outside_delivery_window" => Ok(Self::OutsideDeliveryWindow),
            "other" => Ok(Self::Other),
            _ => Err(InvoiceError::UnknownIssueType(s.to_string())),
        }
    }

    /// The canonical wire name of this issue type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RecipientRefused => "recipient_refused",
            Self::NoOneToReceive => "no_one_to_receive",
            Self::WrongAddress => "wrong_address",
            Self::DamagedGoods => "damaged_goods",
            Self::QuantityMismatch => "quantity_mismatch",
            Self::OutsideDeliveryWindow => "outside_delivery_window",
            Self::Other => "other",
        }
    }
}

impl std::fmt::Display for IssueType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

/// Errors from invoice resolution.
#[derive(Error, Debug)]
pub enum InvoiceError {
    /// The invoice has already been resolved; resolutions are terminal.
    #[error("invoice {invoice_id} is already {status}, cannot resolve again")]
    AlreadyResolved {
        /// The invoice.
        invoice_id: InvoiceId,
        /// Its current (terminal) status.
        status: InvoiceStatus,
    },

    /// A delivered resolution requires a non-empty proof reference.
    #[error("proof reference must not be empty")]
    EmptyProofRef,

    /// A divergent resolution requires non-empty issue details.
    #[error("issue details must not be empty")]
    EmptyIssueDetails,

    /// Issue type is not a member of the closed enumeration.
    #[error("unknown issue type: {0:?}")]
    UnknownIssueType(String),
}

// ─── Resolution ──────────────────────────────────────────────────────

/// The terminal outcome a driver records for one invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InvoiceResolution {
    /// Delivered as planned; `proof_ref` is an opaque URI into the proof
    /// object store.
    Delivered {
        /// Reference to the stored proof of delivery.
        proof_ref: String,
    },
    /// Delivery diverged from plan.
    Divergent {
        /// Categorized reason.
        issue_type: IssueType,
        /// Driver's free-text description.
        issue_details: String,
    },
}

impl InvoiceResolution {
    /// Validate the payload of this resolution.
    ///
    /// Rejects empty proof references and empty issue details before any
    /// state is touched.
    pub fn validate(&self) -> Result<(), InvoiceError> {
        match self {
            Self::Delivered { proof_ref } if proof_ref.trim().is_empty() => {
                Err(InvoiceError::EmptyProofRef)
            }
            Self::Divergent { issue_details, .. } if issue_details.trim().is_empty() => {
                Err(InvoiceError::EmptyIssueDetails)
            }
            _ => Ok(()),
        }
    }

    /// The status this resolution transitions the invoice into.
    pub fn target_status(&self) -> InvoiceStatus {
        match self {
            Self::Delivered { .. } => InvoiceStatus::Delivered,
            Self::Divergent { .. } => InvoiceStatus::Divergent,
        }
    }
}

// ─── Invoice ─────────────────────────────────────────────────────────

/// A single delivery unit within a shipment.
///
/// `shipment_id` is a back-reference, not ownership — the shipment owns its
/// invoices, and an invoice can never be reassigned to another shipment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Invoice {
    /// Unique invoice identifier.
    pub id: InvoiceId,
    /// The owning shipment.
    pub shipment_id: ShipmentId,
    /// The fiscal invoice number printed on the paperwork.
    pub number: String,
    /// Current resolution status.
    pub status: InvoiceStatus,
    /// Proof-of-delivery reference, set only on DELIVERED.
    pub proof_ref: Option<String>,
    /// Divergence category, set only on DIVERGENT.
    pub issue_type: Option<IssueType>,
    /// Divergence description, set only on DIVERGENT.
    pub issue_details: Option<String>,
    /// When the invoice reached a terminal status.
    pub completed_at: Option<Timestamp>,
}

impl Invoice {
    /// Create a new PENDING invoice owned by `shipment_id`.
    pub fn new(shipment_id: ShipmentId, number: impl Into<String>) -> Self {
        Self {
            id: InvoiceId::new(),
            shipment_id,
            number: number.into(),
            status: InvoiceStatus::Pending,
            proof_ref: None,
            issue_type: None,
            issue_details: None,
            completed_at: None,
        }
    }

    /// Apply a terminal resolution (PENDING → DELIVERED | DIVERGENT).
    ///
    /// Fails with [`InvoiceError::AlreadyResolved`] unless the invoice is
    /// still PENDING. Callers run this under the store's write lock, which
    /// makes it the conditional-update primitive: at most one concurrent
    /// resolution observes PENDING and wins.
    pub fn resolve(&mut self, resolution: InvoiceResolution, at: Timestamp) -> Result<(), InvoiceError> {
        if self.status.is_terminal() {
            return Err(InvoiceError::AlreadyResolved {
                invoice_id: self.id,
                status: self.status,
            });
        }
        resolution.validate()?;
        match resolution {
            InvoiceResolution::Delivered { proof_ref } => {
                self.status = InvoiceStatus::Delivered;
                self.proof_ref = Some(proof_ref);
            }
            InvoiceResolution::Divergent {
                issue_type,
                issue_details,
            } => {
                self.status = InvoiceStatus::Divergent;
                self.issue_type = Some(issue_type);
                self.issue_details = Some(issue_details);
            }
        }
        self.completed_at = Some(at);
        Ok(())
    }

    /// Whether the invoice has reached a terminal status.
    pub fn is_resolved(&self) -> bool {
        self.status.is_terminal()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn delivered(proof: &str) -> InvoiceResolution {
        InvoiceResolution::Delivered {
            proof_ref: proof.to_string(),
        }
    }

    fn divergent(details: &str) -> InvoiceResolution {
        InvoiceResolution::Divergent {
            issue_type: IssueType::DamagedGoods,
            issue_details: details.to_string(),
        }
    }

    fn make_invoice() -> Invoice {
        Invoice::new(ShipmentId::new(), "NF-001")
    }

    // ── Transition tests ─────────────────────────────────────────────

    #[test]
    fn test_new_invoice_is_pending() {
        let inv = make_invoice();
        assert_eq!(inv.status, InvoiceStatus::Pending);
        assert!(!inv.is_resolved());
        assert!(inv.completed_at.is_none());
    }

    #[test]
    fn test_resolve_delivered_sets_proof_and_timestamp() {
        let mut inv = make_invoice();
        inv.resolve(delivered("proofs/abc123"), Timestamp::now()).unwrap();
        assert_eq!(inv.status, InvoiceStatus::Delivered);
        assert_eq!(inv.proof_ref.as_deref(), Some("proofs/abc123"));
        assert!(inv.completed_at.is_some());
        assert!(inv.issue_type.is_none());
    }

    #[test]
    fn test_resolve_divergent_sets_issue_fields() {
        let mut inv = make_invoice();
        inv.resolve(divergent("box crushed on arrival"), Timestamp::now())
            .unwrap();
        assert_eq!(inv.status, InvoiceStatus::Divergent);
        assert_eq!(inv.issue_type, Some(IssueType::DamagedGoods));
        assert_eq!(inv.issue_details.as_deref(), Some("box crushed on arrival"));
        assert!(inv.proof_ref.is_none());
    }

    #[test]
    fn test_second_resolution_is_rejected() {
        let mut inv = make_invoice();
        inv.resolve(delivered("proofs/1"), Timestamp::now()).unwrap();
        let before = inv.clone();

        for attempt in [delivered("proofs/2"), divergent("late attempt")] {
            let err = inv.resolve(attempt, Timestamp::now()).unwrap_err();
            assert!(matches!(err, InvoiceError::AlreadyResolved { .. }));
        }
        // No further mutation happened.
        assert_eq!(inv, before);
    }

    #[test]
    fn test_divergent_then_delivered_is_rejected() {
        let mut inv = make_invoice();
        inv.resolve(divergent("nobody home"), Timestamp::now()).unwrap();
        let err = inv.resolve(delivered("proofs/x"), Timestamp::now()).unwrap_err();
        assert!(matches!(
            err,
            InvoiceError::AlreadyResolved {
                status: InvoiceStatus::Divergent,
                ..
            }
        ));
    }

    // ── Validation tests ─────────────────────────────────────────────

    #[test]
    fn test_empty_proof_ref_is_rejected() {
        let mut inv = make_invoice();
        let err = inv.resolve(delivered("   "), Timestamp::now()).unwrap_err();
        assert!(matches!(err, InvoiceError::EmptyProofRef));
        assert_eq!(inv.status, InvoiceStatus::Pending);
    }

    #[test]
    fn test_empty_issue_details_is_rejected() {
        let mut inv = make_invoice();
        let err = inv.resolve(divergent(""), Timestamp::now()).unwrap_err();
        assert!(matches!(err, InvoiceError::EmptyIssueDetails));
        assert_eq!(inv.status, InvoiceStatus::Pending);
    }

    // ── Issue type tests ─────────────────────────────────────────────

    #[test]
    fn test_issue_type_parse_canonical() {
        assert_eq!(
            IssueType::parse("damaged_goods").unwrap(),
            IssueType::DamagedGoods
        );
        assert_eq!(IssueType::parse("other").unwrap(), IssueType::Other);
    }

    #[test]
    fn test_issue_type_parse_is_lenient() {
        assert_eq!(
            IssueType::parse("damaged goods").unwrap(),
            IssueType::DamagedGoods
        );
        assert_eq!(
            IssueType::parse("Outside-Delivery-Window").unwrap(),
            IssueType::OutsideDeliveryWindow
        );
        assert_eq!(
            IssueType::parse("  Recipient Refused ").unwrap(),
            IssueType::RecipientRefused
        );
    }

    #[test]
    fn test_issue_type_parse_rejects_unknown() {
        assert!(IssueType::parse("alien abduction").is_err());
        assert!(IssueType::parse("").is_err());
    }

    #[test]
    fn test_issue_type_roundtrip_through_wire_name() {
        for ty in [
            IssueType::RecipientRefused,
            IssueType::NoOneToReceive,
            IssueType::WrongAddress,
            IssueType::DamagedGoods,
            IssueType::QuantityMismatch,
            IssueType::OutsideDeliveryWindow,
            IssueType::Other,
        ] {
            assert_eq!(IssueType::parse(ty.as_str()).unwrap(), ty);
        }
    }

    // ── Serialization tests ──────────────────────────────────────────

    #[test]
    fn test_invoice_serialization_roundtrip() {
        let mut inv = make_invoice();
        inv.resolve(delivered("proofs/z"), Timestamp::now()).unwrap();
        let json = serde_json::to_string(&inv).unwrap();
        let parsed: Invoice = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, inv);
    }

    #[test]
    fn test_status_wire_form() {
        assert_eq!(
            serde_json::to_string(&InvoiceStatus::Divergent).unwrap(),
            "\"divergent\""
        );
    }
}
