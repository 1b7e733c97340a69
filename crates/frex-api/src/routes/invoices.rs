//! # Invoice Resolution Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/invoices/{invoice_id}/deliver` | `deliver` — owner driver |
//! | `POST` | `/invoices/{invoice_id}/deliver-with-proof` | `deliver_with_proof` — owner driver |
//! | `POST` | `/invoices/{invoice_id}/report-issue` | `report_issue` — owner driver |
//!
//! Both resolutions are driver-only and ownership-checked against the
//! parent shipment inside the engine. A second resolution of any kind
//! returns 409 and changes nothing.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::post;
use axum::{Json, Router};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;

use frex_auth::RolePolicy;
use frex_core::{DriverId, InvoiceId};
use frex_fulfillment::ProofUpload;
use frex_state::IssueType;

use crate::auth::authorize;
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Request to mark an invoice DELIVERED.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliverRequest {
    /// Reference to the already-uploaded proof of delivery.
    pub proof_ref: String,
}

/// Request to upload a proof payload and mark the invoice DELIVERED in one
/// call. The upload must succeed before the status transition commits; on
/// upload failure the invoice stays PENDING and the request may be retried.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeliverWithProofRequest {
    /// MIME type of the payload (e.g. `image/jpeg`).
    pub content_type: String,
    /// Base64-encoded payload bytes.
    pub payload: String,
}

/// Request to mark an invoice DIVERGENT.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportIssueRequest {
    /// One of the closed issue categories; parsing is lenient on case,
    /// spaces, and hyphens ("damaged goods" == "damaged_goods").
    pub issue_type: String,
    pub issue_details: String,
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the invoices router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoices/{invoice_id}/deliver", post(deliver))
        .route(
            "/invoices/{invoice_id}/deliver-with-proof",
            post(deliver_with_proof),
        )
        .route("/invoices/{invoice_id}/report-issue", post(report_issue))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /invoices/{invoice_id}/deliver — Resolve as DELIVERED.
async fn deliver(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(invoice_id): Path<InvoiceId>,
    Json(req): Json<DeliverRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = authorize(&state, &headers, RolePolicy::DriverOnly)?;
    let driver = driver_of(&ctx)?;
    let invoice = state
        .resolution
        .resolve_delivered(invoice_id, driver, &req.proof_ref)?;
    Ok(Json(invoice))
}

/// POST /invoices/{invoice_id}/deliver-with-proof — Upload the proof and
/// resolve as DELIVERED with the stored reference.
async fn deliver_with_proof(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(invoice_id): Path<InvoiceId>,
    Json(req): Json<DeliverWithProofRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = authorize(&state, &headers, RolePolicy::DriverOnly)?;
    let driver = driver_of(&ctx)?;
    let bytes = STANDARD
        .decode(req.payload.as_bytes())
        .map_err(|e| AppError::Validation(format!("payload is not valid base64: {e}")))?;
    let invoice = state.resolution.deliver_with_proof(
        invoice_id,
        driver,
        ProofUpload {
            content_type: req.content_type,
            bytes,
        },
        state.proofs.as_ref(),
    )?;
    Ok(Json(invoice))
}

/// POST /invoices/{invoice_id}/report-issue — Resolve as DIVERGENT.
async fn report_issue(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(invoice_id): Path<InvoiceId>,
    Json(req): Json<ReportIssueRequest>,
) -> Result<impl IntoResponse, AppError> {
    let ctx = authorize(&state, &headers, RolePolicy::DriverOnly)?;
    let driver = driver_of(&ctx)?;
    let issue_type = IssueType::parse(&req.issue_type)
        .map_err(|e| AppError::Validation(e.to_string()))?;
    let invoice =
        state
            .resolution
            .resolve_divergent(invoice_id, driver, issue_type, &req.issue_details)?;
    Ok(Json(invoice))
}

fn driver_of(ctx: &frex_auth::AuthContext) -> Result<DriverId, AppError> {
    // DriverOnly guarantees a driver identity.
    ctx.driver_id()
        .ok_or_else(|| AppError::Internal("driver context without driver id".to_string()))
}
