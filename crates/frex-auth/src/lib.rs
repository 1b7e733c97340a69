//! # frex-auth — Authentication and Authorization
//!
//! Issues and verifies the signed, expiring identity tokens that gate every
//! mutating operation on the platform, and evaluates role predicates before
//! a protected operation runs.
//!
//! ## Modules
//!
//! - **token** — [`TokenService`]: HMAC-SHA256 signed tokens embedding
//!   `{principal_id, role, iat, exp}`. Symmetric signing: issuer and
//!   verifier are the same process. The secret comes from configuration,
//!   never a literal.
//! - **credential** — salted password hashing with constant-time
//!   verification. The hash is owned here and opaque everywhere else.
//! - **guard** — [`AuthorizationGuard`]: extracts the bearer token, verifies
//!   it, evaluates a [`RolePolicy`], and produces an immutable
//!   [`AuthContext`] that callers thread explicitly through the core. The
//!   guard never mutates state.
//! - **principal** — the [`Principal`] record and the [`PrincipalDirectory`]
//!   trait the storage layer implements.
//! - **service** — [`AuthService`]: login, web login, and registration
//!   flows on top of the directory and token service.
//!
//! ## Token Policy
//!
//! Every token carries its role explicitly, regardless of which login
//! surface issued it. TTLs differ by surface (drivers get short-lived
//! tokens, web users long-lived ones) and are configured in one place,
//! [`TokenTtls`].

pub mod credential;
pub mod error;
pub mod guard;
pub mod principal;
pub mod service;
pub mod token;

// Re-export primary types for ergonomic imports.
pub use credential::CredentialHash;
pub use error::AuthError;
pub use guard::{AuthContext, AuthorizationGuard, RolePolicy};
pub use principal::{DirectoryError, NewDriver, NewWebUser, Principal, PrincipalDirectory};
pub use service::{AuthService, LoginSession, TokenTtls};
pub use token::{Claims, SignedToken, TokenService};
