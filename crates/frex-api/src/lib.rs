//! # frex-api — Axum HTTP Surface
//!
//! The HTTP service layer of the FREX delivery platform, built on
//! Axum/Tower/Tokio.
//!
//! ## API Surface
//!
//! | Prefix | Module | Domain |
//! |--------|--------|--------|
//! | `/auth/*` | [`routes::auth`] | Login, token validation, registration |
//! | `/shipments/*` | [`routes::shipments`] | Creation, listings, manual finish |
//! | `/invoices/*` | [`routes::invoices`] | Delivered / divergent resolution |
//! | `/drivers` | [`routes::drivers`] | Driver directory |
//! | `/health` | — | Unauthenticated liveness probe |
//!
//! ## Crate Policy
//!
//! - Sits at the top of the dependency DAG.
//! - No business logic in route handlers — handlers authorize via the
//!   [`frex_auth::AuthorizationGuard`], delegate to the engines in
//!   [`AppState`], and map errors.
//! - All errors map to structured HTTP responses via [`AppError`].

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::response::IntoResponse;
use axum::{Json, Router};
use tower_http::trace::TraceLayer;

pub use config::AppConfig;
pub use error::AppError;
pub use state::AppState;

/// Assemble the full application router.
///
/// `/health` is mounted alongside the API routes; it carries no
/// authorization, matching its role as a liveness probe. Every other route
/// enforces its own policy through the guard.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::auth::router())
        .merge(routes::shipments::router())
        .merge(routes::invoices::router())
        .merge(routes::drivers::router())
        .route("/health", axum::routing::get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness probe — 200 whenever the process is serving.
async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
