//! Platform roles and the permissions derived from them.

use serde::{Deserialize, Serialize};

/// Platform role with different permission levels.
///
/// Serialized lowercase on the wire, matching the identity service's
/// `user.role` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Regular platform member - no admin console access.
    Member,
    /// Organization admin - full access to one organization's views.
    Admin,
    /// Platform superadmin - cross-organization management views.
    Superadmin,
}

impl Role {
    /// Whether this role has platform-wide visibility.
    ///
    /// Always computed from the role, never stored separately, so it
    /// cannot diverge from it.
    #[must_use]
    pub const fn is_superadmin(self) -> bool {
        matches!(self, Self::Superadmin)
    }

    /// Whether this role is allowed into the admin console at all.
    #[must_use]
    pub const fn can_use_console(self) -> bool {
        matches!(self, Self::Admin | Self::Superadmin)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Member => write!(f, "member"),
            Self::Admin => write!(f, "admin"),
            Self::Superadmin => write!(f, "superadmin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            "superadmin" => Ok(Self::Superadmin),
            _ => Err(format!("invalid role: {s}")),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_is_superadmin_derived_from_role() {
        assert!(Role::Superadmin.is_superadmin());
        assert!(!Role::Admin.is_superadmin());
        assert!(!Role::Member.is_superadmin());
    }

    #[test]
    fn test_console_access() {
        assert!(Role::Admin.can_use_console());
        assert!(Role::Superadmin.can_use_console());
        assert!(!Role::Member.can_use_console());
    }

    #[test]
    fn test_wire_format_is_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Superadmin).unwrap(), "\"superadmin\"");
        let role: Role = serde_json::from_str("\"admin\"").unwrap();
        assert_eq!(role, Role::Admin);
    }

    #[test]
    fn test_from_str_roundtrip() {
        for role in [Role::Member, Role::Admin, Role::Superadmin] {
            let parsed: Role = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("owner".parse::<Role>().is_err());
    }
}
