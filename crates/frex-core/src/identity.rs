//! # Domain Identity Newtypes
//!
//! Newtype wrappers for all domain identifiers in the FREX platform.
//! These prevent accidental identifier confusion — you cannot pass a
//! `ShipmentId` where an `InvoiceId` is expected, and an ownership check
//! against a `DriverId` cannot silently receive an admin's `PrincipalId`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

/// Unique identifier for any authenticated principal (driver, admin, viewer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalId(pub Uuid);

/// Unique identifier for a driver. A driver is also a principal; this
/// newtype marks the places where specifically a driver identity is required
/// (shipment ownership, invoice resolution).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DriverId(pub Uuid);

/// Unique identifier for a shipment (a grouped delivery assignment).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShipmentId(pub Uuid);

/// Unique identifier for an invoice (a single proof-of-delivery unit).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoiceId(pub Uuid);

macro_rules! impl_id {
    ($ty:ident, $prefix:literal) => {
        impl $ty {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Parse an identifier from its string form.
            pub fn parse(s: &str) -> Result<Self, CoreError> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| CoreError::InvalidIdentifier {
                        input: s.to_string(),
                        reason: e.to_string(),
                    })
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $ty {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $ty {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }
    };
}

impl_id!(PrincipalId, "principal");
impl_id!(DriverId, "driver");
impl_id!(ShipmentId, "shipment");
impl_id!(InvoiceId, "invoice");

impl DriverId {
    /// View this driver identity as a generic principal identity.
    ///
    /// Drivers authenticate like any other principal; tokens carry a
    /// `PrincipalId` regardless of role.
    pub fn as_principal(&self) -> PrincipalId {
        PrincipalId(self.0)
    }
}

impl PrincipalId {
    /// Reinterpret this principal as a driver identity.
    ///
    /// Valid only when the accompanying role is `Role::Driver`; callers
    /// must check the role first. The type conversion itself is lossless.
    pub fn as_driver(&self) -> DriverId {
        DriverId(self.0)
    }
}
