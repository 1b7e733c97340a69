//! # Role — The Closed Principal Role Enumeration
//!
//! One definition, three variants, exhaustive `match` everywhere. Every
//! token carries a role explicitly; there is no endpoint-implied or
//! table-implied role anywhere in the system.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// The role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Field driver: resolves invoices and finishes own shipments.
    Driver,
    /// Back-office administrator: creates shipments, manages users, reads
    /// history, may finish any shipment.
    Admin,
    /// Read-only back-office user: reads aggregated history.
    Viewer,
}

impl Role {
    /// Parse a role from its lowercase wire form.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            "driver" => Ok(Self::Driver),
            "admin" => Ok(Self::Admin),
            "viewer" => Ok(Self::Viewer),
            other => Err(CoreError::UnknownRole(other.to_string())),
        }
    }

    /// The lowercase wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Driver => "driver",
            Self::Admin => "admin",
            Self::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_roles() {
        assert_eq!(Role::parse("driver").unwrap(), Role::Driver);
        assert_eq!(Role::parse("admin").unwrap(), Role::Admin);
        assert_eq!(Role::parse("viewer").unwrap(), Role::Viewer);
    }

    #[test]
    fn test_parse_rejects_unknown() {
        assert!(Role::parse("superuser").is_err());
        assert!(Role::parse("Admin").is_err());
        assert!(Role::parse("").is_err());
    }

    #[test]
    fn test_wire_form_is_lowercase() {
        let json = serde_json::to_string(&Role::Admin).unwrap();
        assert_eq!(json, "\"admin\"");
        let parsed: Role = serde_json::from_str("\"viewer\"").unwrap();
        assert_eq!(parsed, Role::Viewer);
    }

    #[test]
    fn test_display_matches_parse() {
        for role in [Role::Driver, Role::Admin, Role::Viewer] {
            assert_eq!(Role::parse(&role.to_string()).unwrap(), role);
        }
    }
}
