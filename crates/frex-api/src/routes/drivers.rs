//! # Driver Directory Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `GET` | `/drivers` | `list_drivers` — admin only |

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use frex_auth::RolePolicy;

use crate::auth::authorize;
use crate::error::AppError;
use crate::routes::auth::PrincipalView;
use crate::state::AppState;

/// Build the drivers router.
pub fn router() -> Router<AppState> {
    Router::new().route("/drivers", get(list_drivers))
}

/// GET /drivers — All registered drivers, for shipment assignment.
async fn list_drivers(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    authorize(&state, &headers, RolePolicy::AdminOnly)?;
    let drivers: Vec<PrincipalView> = state
        .auth
        .drivers()?
        .into_iter()
        .map(PrincipalView::from)
        .collect();
    Ok(Json(drivers))
}
