//! # Bearer Token Extraction
//!
//! Pulls the bearer token out of the `Authorization` header and runs it
//! through the [`AuthorizationGuard`]. Route handlers call [`authorize`]
//! with the policy the operation requires and thread the returned
//! [`AuthContext`] into the engines.

use axum::http::header::AUTHORIZATION;
use axum::http::HeaderMap;

use frex_auth::{AuthContext, RolePolicy};

use crate::error::AppError;
use crate::state::AppState;

/// Extract the bearer token from `Authorization: Bearer <token>`.
///
/// Returns `None` when the header is absent, not valid UTF-8, or carries a
/// different scheme — the guard turns that into `Unauthenticated`.
pub fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Authorize the request under `policy`, mapping auth failures to HTTP
/// errors.
pub fn authorize(
    state: &AppState,
    headers: &HeaderMap,
    policy: RolePolicy,
) -> Result<AuthContext, AppError> {
    Ok(state.guard.authorize(bearer(headers), policy)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::http::HeaderValue;

    fn headers_with(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_extraction() {
        assert_eq!(bearer(&headers_with("Bearer abc.def")), Some("abc.def"));
        assert_eq!(bearer(&headers_with("Bearer   abc.def ")), Some("abc.def"));
    }

    #[test]
    fn test_non_bearer_schemes_are_ignored() {
        assert_eq!(bearer(&headers_with("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer(&headers_with("bearer abc")), None);
        assert_eq!(bearer(&HeaderMap::new()), None);
    }
}
