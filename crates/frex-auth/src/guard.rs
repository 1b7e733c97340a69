//! # Authorization Guard — Role-Predicate Evaluation
//!
//! Wraps every protected entry point: extract the bearer token, verify it,
//! evaluate the required-role predicate, and hand back an immutable
//! [`AuthContext`]. Callers thread the context explicitly as a function
//! argument through the core — there is no ambient request-scoped identity
//! and the guard itself never mutates anything.
//!
//! ## Contract
//!
//! - Token absent → [`AuthError::Unauthenticated`].
//! - Token malformed or unverifiable → `Malformed` / `InvalidSignature` /
//!   `Expired`.
//! - Token verified but role outside the allowed set → [`AuthError::Forbidden`].
//! - Otherwise: `AuthContext { principal_id, role }`.
//!
//! Ownership checks against a specific shipment's driver are not the
//! guard's job — the fulfillment engines enforce those where the shipment
//! is actually loaded.

use frex_core::{DriverId, PrincipalId, Role};

use crate::error::AuthError;
use crate::token::TokenService;

/// The required-role predicate for a protected operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RolePolicy {
    /// Any authenticated principal.
    AnyAuthenticated,
    /// Drivers only.
    DriverOnly,
    /// Back-office administrators only.
    AdminOnly,
    /// Back-office read or write: admin or viewer.
    AdminOrViewer,
}

impl RolePolicy {
    /// Whether `role` satisfies this predicate.
    pub fn allows(&self, role: Role) -> bool {
        match self {
            Self::AnyAuthenticated => true,
            Self::DriverOnly => role == Role::Driver,
            Self::AdminOnly => role == Role::Admin,
            Self::AdminOrViewer => matches!(role, Role::Admin | Role::Viewer),
        }
    }

    /// Human-readable description of the allowed set, for error messages.
    pub fn describe(&self) -> &'static str {
        match self {
            Self::AnyAuthenticated => "any authenticated principal",
            Self::DriverOnly => "driver",
            Self::AdminOnly => "admin",
            Self::AdminOrViewer => "admin or viewer",
        }
    }
}

/// The verified identity attached to one request, immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthContext {
    /// The authenticated principal.
    pub principal_id: PrincipalId,
    /// The principal's role.
    pub role: Role,
}

impl AuthContext {
    /// The caller's driver identity, if the caller is a driver.
    pub fn driver_id(&self) -> Option<DriverId> {
        (self.role == Role::Driver).then(|| self.principal_id.as_driver())
    }

    /// Whether the caller is an administrator.
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// Evaluates role predicates against verified tokens.
#[derive(Debug, Clone)]
pub struct AuthorizationGuard {
    tokens: TokenService,
}

impl AuthorizationGuard {
    /// Create a guard verifying against the given token service.
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    /// Authorize a request carrying `bearer` under `policy`.
    pub fn authorize(
        &self,
        bearer: Option<&str>,
        policy: RolePolicy,
    ) -> Result<AuthContext, AuthError> {
        let token = bearer.ok_or(AuthError::Unauthenticated)?;
        let claims = self.tokens.verify(token)?;
        if !policy.allows(claims.role) {
            tracing::debug!(
                role = %claims.role,
                required = policy.describe(),
                "role predicate rejected request"
            );
            return Err(AuthError::Forbidden {
                required: policy.describe(),
                actual: claims.role,
            });
        }
        Ok(AuthContext {
            principal_id: claims.principal_id,
            role: claims.role,
        })
    }

    /// Whether `bearer` is a currently valid token, regardless of role.
    pub fn is_valid(&self, bearer: Option<&str>) -> bool {
        self.authorize(bearer, RolePolicy::AnyAuthenticated).is_ok()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn guard() -> AuthorizationGuard {
        AuthorizationGuard::new(TokenService::new(b"guard-test-secret".to_vec()))
    }

    fn token_for(guard: &AuthorizationGuard, role: Role) -> String {
        guard
            .tokens
            .issue(PrincipalId::new(), role, 3_600)
            .unwrap()
            .into_string()
    }

    #[test]
    fn test_missing_token_is_unauthenticated() {
        let err = guard()
            .authorize(None, RolePolicy::AnyAuthenticated)
            .unwrap_err();
        assert!(matches!(err, AuthError::Unauthenticated));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let err = guard()
            .authorize(Some("not-a-token"), RolePolicy::AnyAuthenticated)
            .unwrap_err();
        assert!(matches!(err, AuthError::Malformed));
    }

    #[test]
    fn test_any_authenticated_accepts_all_roles() {
        let g = guard();
        for role in [Role::Driver, Role::Admin, Role::Viewer] {
            let token = token_for(&g, role);
            let ctx = g
                .authorize(Some(&token), RolePolicy::AnyAuthenticated)
                .unwrap();
            assert_eq!(ctx.role, role);
        }
    }

    #[test]
    fn test_admin_only_rejects_driver_and_viewer() {
        let g = guard();
        for role in [Role::Driver, Role::Viewer] {
            let token = token_for(&g, role);
            let err = g.authorize(Some(&token), RolePolicy::AdminOnly).unwrap_err();
            assert!(matches!(err, AuthError::Forbidden { .. }));
        }
        let token = token_for(&g, Role::Admin);
        assert!(g.authorize(Some(&token), RolePolicy::AdminOnly).is_ok());
    }

    #[test]
    fn test_driver_only_rejects_admin_and_viewer() {
        let g = guard();
        for role in [Role::Admin, Role::Viewer] {
            let token = token_for(&g, role);
            let err = g
                .authorize(Some(&token), RolePolicy::DriverOnly)
                .unwrap_err();
            assert!(matches!(err, AuthError::Forbidden { .. }));
        }
        let token = token_for(&g, Role::Driver);
        assert!(g.authorize(Some(&token), RolePolicy::DriverOnly).is_ok());
    }

    #[test]
    fn test_admin_or_viewer_rejects_driver() {
        let g = guard();
        let token = token_for(&g, Role::Driver);
        let err = g
            .authorize(Some(&token), RolePolicy::AdminOrViewer)
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Forbidden {
                actual: Role::Driver,
                ..
            }
        ));
        for role in [Role::Admin, Role::Viewer] {
            let token = token_for(&g, role);
            assert!(g.authorize(Some(&token), RolePolicy::AdminOrViewer).is_ok());
        }
    }

    #[test]
    fn test_driver_context_exposes_driver_id() {
        let g = guard();
        let token = token_for(&g, Role::Driver);
        let ctx = g
            .authorize(Some(&token), RolePolicy::AnyAuthenticated)
            .unwrap();
        assert!(ctx.driver_id().is_some());
        assert!(!ctx.is_admin());

        let token = token_for(&g, Role::Admin);
        let ctx = g
            .authorize(Some(&token), RolePolicy::AnyAuthenticated)
            .unwrap();
        assert!(ctx.driver_id().is_none());
        assert!(ctx.is_admin());
    }

    #[test]
    fn test_is_valid() {
        let g = guard();
        let token = token_for(&g, Role::Viewer);
        assert!(g.is_valid(Some(&token)));
        assert!(!g.is_valid(Some("junk")));
        assert!(!g.is_valid(None));
    }
}
