//! # Shipment Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/shipments` | `create_shipment` — admin only |
//! | `GET`  | `/shipments/mine` | `my_shipments` — driver only |
//! | `GET`  | `/shipments/history` | `history` — admin or viewer |
//! | `POST` | `/shipments/{shipment_id}/finish` | `finish` — owner driver or admin |

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use frex_auth::RolePolicy;
use frex_core::{DriverId, ShipmentId};
use frex_fulfillment::NewShipment;
use frex_state::{Invoice, Shipment};

use crate::auth::authorize;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request to create a shipment with its invoice set.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateShipmentRequest {
    pub name: String,
    pub destination: String,
    #[serde(default)]
    pub description: String,
    /// The driver to assign. Must be a registered driver.
    pub driver_id: DriverId,
    /// One invoice is created per number.
    pub invoice_numbers: Vec<String>,
}

/// A shipment together with its invoices.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShipmentWithInvoices {
    pub shipment: Shipment,
    pub invoices: Vec<Invoice>,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the shipments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/shipments", post(create_shipment))
        .route("/shipments/mine", get(my_shipments))
        .route("/shipments/history", get(history))
        .route("/shipments/{shipment_id}/finish", post(finish))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /shipments — Create a shipment and its invoices. Admin only.
async fn create_shipment(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateShipmentRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&state, &headers, RolePolicy::AdminOnly)?;
    let (shipment, invoices) = state.registry.create(NewShipment {
        name: req.name,
        destination: req.destination,
        description: req.description,
        driver_id: req.driver_id,
        invoice_numbers: req.invoice_numbers,
    })?;
    Ok((
        StatusCode::CREATED,
        Json(ShipmentWithInvoices { shipment, invoices }),
    ))
}

/// GET /shipments/mine — The calling driver's shipments, with invoices.
async fn my_shipments(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let ctx = authorize(&state, &headers, RolePolicy::DriverOnly)?;
    // DriverOnly guarantees a driver identity.
    let driver: DriverId = ctx
        .driver_id()
        .ok_or_else(|| AppError::Internal("driver context without driver id".to_string()))?;

    let shipments = state
        .shipments
        .shipments_for_driver(driver)
        .map_err(|e| AppError::Internal(e.to_string()))?;
    let mut entries = Vec::with_capacity(shipments.len());
    for shipment in shipments {
        let invoices = state
            .invoices
            .invoices_for_shipment(shipment.id)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        entries.push(ShipmentWithInvoices { shipment, invoices });
    }
    Ok(Json(entries))
}

/// GET /shipments/history — Every shipment with nested invoices, newest
/// first. Admin or viewer.
async fn history(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    authorize(&state, &headers, RolePolicy::AdminOrViewer)?;
    let entries: Vec<ShipmentWithInvoices> = state
        .shipments
        .shipments_with_invoices()
        .map_err(|e| AppError::Internal(e.to_string()))?
        .into_iter()
        .map(|(shipment, invoices)| ShipmentWithInvoices { shipment, invoices })
        .collect();
    Ok(Json(entries))
}

/// POST /shipments/{shipment_id}/finish — Explicit manual finish. The
/// engine enforces owner-driver-or-admin and the all-invoices-terminal
/// precondition.
async fn finish(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(shipment_id): Path<ShipmentId>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = authorize(&state, &headers, RolePolicy::AnyAuthenticated)?;
    let shipment = state.completion.finish_manually(shipment_id, &ctx)?;
    Ok(Json(shipment))
}
