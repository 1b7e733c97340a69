//! # Authentication Endpoints
//!
//! | Method | Path | Handler |
//! |--------|------|---------|
//! | `POST` | `/auth/login` | `login` — driver (mobile) login |
//! | `POST` | `/auth/web-login` | `web_login` — admin/viewer login |
//! | `GET`  | `/auth/validate-token` | `validate_token` |
//! | `POST` | `/auth/register` | `register` — driver self-registration |
//! | `POST` | `/auth/users` | `create_web_user` — admin only |

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use frex_auth::{NewDriver, NewWebUser, Principal, RolePolicy};
use frex_core::{PrincipalId, Role};

use crate::auth::{authorize, bearer};
use crate::error::AppError;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Login request, shared by both login surfaces.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Driver login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    pub principal_id: PrincipalId,
    pub name: String,
}

/// Web login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct WebLoginResponse {
    /// Bearer token for subsequent requests.
    pub token: String,
    pub role: Role,
    pub name: String,
}

/// Token validation response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ValidateTokenResponse {
    pub valid: bool,
}

/// Driver self-registration request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterDriverRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub transport_company: String,
    pub license_plate: String,
}

/// Admin-initiated web user creation request.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateWebUserRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    /// `admin` or `viewer`; `driver` is rejected.
    pub role: Role,
}

/// Public view of a principal. Never carries the credential hash.
#[derive(Debug, Serialize, Deserialize)]
pub struct PrincipalView {
    pub id: PrincipalId,
    pub role: Role,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transport_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
}

impl From<Principal> for PrincipalView {
    fn from(p: Principal) -> Self {
        Self {
            id: p.id,
            role: p.role,
            name: p.name,
            email: p.email,
            transport_company: p.transport_company,
            license_plate: p.license_plate,
        }
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/web-login", post(web_login))
        .route("/auth/validate-token", get(validate_token))
        .route("/auth/register", post(register))
        .route("/auth/users", post(create_web_user))
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /auth/login — Driver login.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth.login(&req.email, &req.password)?;
    Ok(Json(LoginResponse {
        token: session.token.into_string(),
        principal_id: session.principal_id,
        name: session.name,
    }))
}

/// POST /auth/web-login — Admin/viewer login.
async fn web_login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.auth.web_login(&req.email, &req.password)?;
    Ok(Json(WebLoginResponse {
        token: session.token.into_string(),
        role: session.role,
        name: session.name,
    }))
}

/// GET /auth/validate-token — Report whether the presented token is
/// currently valid. Always 200; the verdict is in the body.
async fn validate_token(State(state): State<AppState>, headers: HeaderMap) -> impl IntoResponse {
    Json(ValidateTokenResponse {
        valid: state.guard.is_valid(bearer(&headers)),
    })
}

/// POST /auth/register — Driver self-registration. Unauthenticated.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterDriverRequest>,
) -> Result<impl IntoResponse, AppError> {
    let principal = state.auth.register_driver(NewDriver {
        name: req.name,
        email: req.email,
        password: req.password,
        transport_company: req.transport_company,
        license_plate: req.license_plate,
    })?;
    Ok((StatusCode::CREATED, Json(PrincipalView::from(principal))))
}

/// POST /auth/users — Create an admin or viewer account. Admin only.
async fn create_web_user(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(req): Json<CreateWebUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&state, &headers, RolePolicy::AdminOnly)?;
    let principal = state.auth.register_web_user(NewWebUser {
        name: req.name,
        email: req.email,
        password: req.password,
        role: req.role,
    })?;
    Ok((StatusCode::CREATED, Json(PrincipalView::from(principal))))
}
