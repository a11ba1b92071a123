//! User identity and organization reference types.

use serde::{Deserialize, Serialize};

use super::{Email, OrgId, Role, UserId};

/// An authenticated user's identity as returned by the identity service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Opaque user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Login email address.
    pub email: Email,
    /// Platform role.
    pub role: Role,
}

/// Reference to the organization an admin belongs to.
///
/// Superadmins are not scoped to an organization and carry no reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationRef {
    /// Opaque organization ID.
    pub id: OrgId,
    /// Organization display name.
    pub name: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_user_wire_shape() {
        let json = serde_json::json!({
            "id": "admin_1",
            "name": "Test",
            "email": "test@example.com",
            "role": "admin",
        });

        let user: User = serde_json::from_value(json).unwrap();
        assert_eq!(user.id, UserId::new("admin_1"));
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.email.as_str(), "test@example.com");
    }
}
