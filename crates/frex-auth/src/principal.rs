//! # Principals and the Directory Trait
//!
//! A [`Principal`] is any authenticated actor: driver, admin, or viewer.
//! The credential hash lives on the record but is opaque outside this
//! crate. Storage backends implement [`PrincipalDirectory`]; the in-memory
//! reference implementation lives in `frex-store`.

use thiserror::Error;

use frex_core::{PrincipalId, Role};

use crate::credential::CredentialHash;

/// An authenticated actor.
#[derive(Debug, Clone)]
pub struct Principal {
    /// Unique principal identifier.
    pub id: PrincipalId,
    /// The principal's role.
    pub role: Role,
    /// Display name.
    pub name: String,
    /// Login email, unique across all roles.
    pub email: String,
    /// Salted credential hash, opaque to everything outside frex-auth.
    pub credential: CredentialHash,
    /// Driver's transport company, if the principal is a driver.
    pub transport_company: Option<String>,
    /// Driver's vehicle license plate, if the principal is a driver.
    pub license_plate: Option<String>,
}

/// Registration input for a new driver.
#[derive(Debug, Clone)]
pub struct NewDriver {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password; hashed before it reaches the directory.
    pub password: String,
    /// Transport company the driver works for.
    pub transport_company: String,
    /// Vehicle license plate.
    pub license_plate: String,
}

/// Registration input for a new back-office user (admin or viewer).
#[derive(Debug, Clone)]
pub struct NewWebUser {
    /// Display name.
    pub name: String,
    /// Login email.
    pub email: String,
    /// Plaintext password; hashed before it reaches the directory.
    pub password: String,
    /// Requested role; must be `Admin` or `Viewer`.
    pub role: Role,
}

/// Errors from the principal directory backend.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// The email is already registered.
    #[error("email already in use: {0}")]
    DuplicateEmail(String),

    /// The backend failed.
    #[error("directory backend error: {0}")]
    Backend(String),
}

/// The principal directory the storage layer provides.
///
/// Emails are unique across all roles — the directory enforces it and
/// reports [`DirectoryError::DuplicateEmail`] on violation.
pub trait PrincipalDirectory: Send + Sync {
    /// Insert a new principal. Fails on duplicate email.
    fn insert(&self, principal: Principal) -> Result<(), DirectoryError>;

    /// Look up a principal by login email. `Ok(None)` if absent.
    fn find_by_email(&self, email: &str) -> Result<Option<Principal>, DirectoryError>;

    /// Look up a principal by id. `Ok(None)` if absent.
    fn principal(&self, id: PrincipalId) -> Result<Option<Principal>, DirectoryError>;

    /// All registered drivers, for back-office shipment assignment.
    fn drivers(&self) -> Result<Vec<Principal>, DirectoryError>;
}
