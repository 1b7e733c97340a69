//! # frex-core — Foundational Types for the FREX Delivery Platform
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace: domain identifier newtypes, the closed [`Role`] enumeration,
//! and the UTC-only [`Timestamp`] type. Every other crate depends on
//! `frex-core`; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype wrappers for domain primitives.** `DriverId`, `PrincipalId`,
//!    `ShipmentId`, `InvoiceId` — all newtypes over UUIDs. No bare strings
//!    or raw UUIDs for identifiers, so a shipment id cannot be passed where
//!    an invoice id is expected.
//!
//! 2. **Single closed `Role` enumeration.** One definition with three
//!    variants (driver, admin, viewer), carried explicitly in every token.
//!    There is no table-implied or endpoint-implied role anywhere in the
//!    system.
//!
//! 3. **UTC-only timestamps.** The `Timestamp` type enforces UTC with
//!    seconds precision. Non-UTC inputs are rejected at construction.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `frex-*` crates (this is the leaf of the DAG).
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - All public types derive `Debug`, `Clone`, and implement
//!   `Serialize`/`Deserialize`.

pub mod error;
pub mod identity;
pub mod role;
pub mod temporal;

// Re-export primary types for ergonomic imports.
pub use error::CoreError;
pub use identity::{DriverId, InvoiceId, PrincipalId, ShipmentId};
pub use role::Role;
pub use temporal::Timestamp;
