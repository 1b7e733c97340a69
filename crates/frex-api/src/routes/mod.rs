//! # API Route Modules
//!
//! Each module builds an Axum `Router` for one surface area:
//!
//! - `auth` — driver login, web login, token validation, registration.
//! - `shipments` — creation, driver and back-office listings, manual finish.
//! - `invoices` — delivered / divergent resolution.
//! - `drivers` — back-office driver directory.
//!
//! Routers are merged in [`crate::app`]. No business logic lives here:
//! handlers authorize, delegate to the engines in [`crate::state::AppState`],
//! and map errors through [`crate::error::AppError`].

pub mod auth;
pub mod drivers;
pub mod invoices;
pub mod shipments;
