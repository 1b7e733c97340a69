//! # Auth Service — Login and Registration Flows
//!
//! Sits on top of the [`PrincipalDirectory`] and [`TokenService`]: verifies
//! credentials and mints tokens for the two login surfaces, and registers
//! new principals with hashed credentials.
//!
//! ## Issuance Policy
//!
//! One policy for both surfaces: the role is always embedded in the token.
//! Only the TTL differs — drivers authenticate from the field on short-lived
//! tokens, back-office users on long-lived ones. Both TTLs live in
//! [`TokenTtls`] and nowhere else.

use std::sync::Arc;

use frex_core::{PrincipalId, Role};

use crate::credential::CredentialHash;
use crate::error::AuthError;
use crate::principal::{DirectoryError, NewDriver, NewWebUser, Principal, PrincipalDirectory};
use crate::token::{SignedToken, TokenService};

/// Token lifetimes per login surface, in seconds.
#[derive(Debug, Clone, Copy)]
pub struct TokenTtls {
    /// Driver (mobile) login TTL.
    pub driver_secs: i64,
    /// Web (admin/viewer) login TTL.
    pub web_secs: i64,
}

impl Default for TokenTtls {
    fn default() -> Self {
        Self {
            driver_secs: 60 * 60,
            web_secs: 24 * 60 * 60,
        }
    }
}

/// The result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginSession {
    /// The issued bearer token.
    pub token: SignedToken,
    /// The authenticated principal.
    pub principal_id: PrincipalId,
    /// The principal's role.
    pub role: Role,
    /// Display name, for the client's greeting header.
    pub name: String,
}

/// Login and registration flows.
pub struct AuthService {
    directory: Arc<dyn PrincipalDirectory>,
    tokens: TokenService,
    ttls: TokenTtls,
}

impl AuthService {
    /// Create the service over a directory and token service.
    pub fn new(
        directory: Arc<dyn PrincipalDirectory>,
        tokens: TokenService,
        ttls: TokenTtls,
    ) -> Self {
        Self {
            directory,
            tokens,
            ttls,
        }
    }

    /// Driver login. Fails with [`AuthError::InvalidCredentials`] on
    /// unknown email, wrong password, or a non-driver principal — the three
    /// cases are deliberately indistinguishable.
    pub fn login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        self.login_for(email, password, Role::Driver, self.ttls.driver_secs)
    }

    /// Web login for admins and viewers.
    pub fn web_login(&self, email: &str, password: &str) -> Result<LoginSession, AuthError> {
        let principal = self.verify_credentials(email, password)?;
        if !matches!(principal.role, Role::Admin | Role::Viewer) {
            return Err(AuthError::InvalidCredentials);
        }
        self.session_for(principal, self.ttls.web_secs)
    }

    /// Register a new driver, hashing the password before storage.
    pub fn register_driver(&self, input: NewDriver) -> Result<Principal, AuthError> {
        require_nonempty("name", &input.name)?;
        require_nonempty("email", &input.email)?;
        require_nonempty("password", &input.password)?;
        require_nonempty("transport_company", &input.transport_company)?;
        require_nonempty("license_plate", &input.license_plate)?;

        let principal = Principal {
            id: PrincipalId::new(),
            role: Role::Driver,
            name: input.name,
            email: input.email,
            credential: CredentialHash::from_password(&input.password),
            transport_company: Some(input.transport_company),
            license_plate: Some(input.license_plate),
        };
        self.directory.insert(principal.clone())?;
        tracing::info!(principal = %principal.id, "registered driver");
        Ok(principal)
    }

    /// Register a new back-office user. The requested role must be admin or
    /// viewer — drivers register through their own flow.
    pub fn register_web_user(&self, input: NewWebUser) -> Result<Principal, AuthError> {
        require_nonempty("name", &input.name)?;
        require_nonempty("email", &input.email)?;
        require_nonempty("password", &input.password)?;
        if input.role == Role::Driver {
            return Err(AuthError::Validation(
                "web users must be admin or viewer".to_string(),
            ));
        }

        let principal = Principal {
            id: PrincipalId::new(),
            role: input.role,
            name: input.name,
            email: input.email,
            credential: CredentialHash::from_password(&input.password),
            transport_company: None,
            license_plate: None,
        };
        self.directory.insert(principal.clone())?;
        tracing::info!(principal = %principal.id, role = %principal.role, "registered web user");
        Ok(principal)
    }

    /// All registered drivers, for back-office shipment assignment.
    pub fn drivers(&self) -> Result<Vec<Principal>, AuthError> {
        Ok(self.directory.drivers()?)
    }

    fn login_for(
        &self,
        email: &str,
        password: &str,
        required_role: Role,
        ttl_secs: i64,
    ) -> Result<LoginSession, AuthError> {
        let principal = self.verify_credentials(email, password)?;
        if principal.role != required_role {
            return Err(AuthError::InvalidCredentials);
        }
        self.session_for(principal, ttl_secs)
    }

    fn verify_credentials(&self, email: &str, password: &str) -> Result<Principal, AuthError> {
        let principal = self
            .directory
            .find_by_email(email)?
            .ok_or(AuthError::InvalidCredentials)?;
        if !principal.credential.verify(password) {
            return Err(AuthError::InvalidCredentials);
        }
        Ok(principal)
    }

    fn session_for(&self, principal: Principal, ttl_secs: i64) -> Result<LoginSession, AuthError> {
        let token = self.tokens.issue(principal.id, principal.role, ttl_secs)?;
        tracing::debug!(principal = %principal.id, role = %principal.role, "issued session token");
        Ok(LoginSession {
            token,
            principal_id: principal.id,
            role: principal.role,
            name: principal.name,
        })
    }
}

impl From<DirectoryError> for AuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail(email) => AuthError::DuplicateEmail(email),
            DirectoryError::Backend(msg) => AuthError::Directory(msg),
        }
    }
}

fn require_nonempty(field: &str, value: &str) -> Result<(), AuthError> {
    if value.trim().is_empty() {
        return Err(AuthError::Validation(format!("{field} must not be empty")));
    }
    Ok(())
}

// ─── Tests ───────────────────────────────────────────────────────────
