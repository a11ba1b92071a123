//! The persisted console session.

use serde::{Deserialize, Serialize};

use super::{OrgId, OrganizationRef, Role, User};

/// Record of the currently authenticated admin identity and tokens.
///
/// A `Session` is created on successful login or password setup, mutated
/// on profile update and token refresh, and destroyed on logout. It is
/// the sole source of truth for "who is logged in": at most one exists
/// per client, persisted whole to a single storage slot so it survives
/// restarts.
///
/// Role-derived flags such as [`Session::is_superadmin`] are computed
/// from `user.role`, never stored independently.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// The authenticated user.
    pub user: User,
    /// The organization this admin is scoped to (`None` for superadmins).
    pub organization: Option<OrganizationRef>,
    /// Bearer token for authenticated requests.
    pub access_token: String,
    /// Token exchanged for a fresh access/refresh pair.
    pub refresh_token: String,
}

impl Session {
    /// Create a session from the identity service's auth payload.
    #[must_use]
    pub const fn new(
        user: User,
        organization: Option<OrganizationRef>,
        access_token: String,
        refresh_token: String,
    ) -> Self {
        Self {
            user,
            organization,
            access_token,
            refresh_token,
        }
    }

    /// Whether the session belongs to a superadmin.
    #[must_use]
    pub const fn is_superadmin(&self) -> bool {
        self.user.role.is_superadmin()
    }

    /// The session's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.user.role
    }

    /// The organization ID page views scope their data requests to.
    #[must_use]
    pub fn organization_id(&self) -> Option<&OrgId> {
        self.organization.as_ref().map(|org| &org.id)
    }

    /// Replace the token pair, keeping the identity untouched.
    #[must_use]
    pub fn with_tokens(mut self, access_token: String, refresh_token: String) -> Self {
        self.access_token = access_token;
        self.refresh_token = refresh_token;
        self
    }

    /// Replace the user identity, keeping tokens and organization.
    #[must_use]
    pub fn with_user(mut self, user: User) -> Self {
        self.user = user;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::types::{Email, Role, UserId};

    fn admin_session() -> Session {
        Session::new(
            User {
                id: UserId::new("admin_1"),
                name: "Test".to_owned(),
                email: Email::parse("test@example.com").unwrap(),
                role: Role::Admin,
            },
            Some(OrganizationRef {
                id: OrgId::new("org_1"),
                name: "LearnWithAndi Bootcamp".to_owned(),
            }),
            "access-1".to_owned(),
            "refresh-1".to_owned(),
        )
    }

    #[test]
    fn test_is_superadmin_tracks_role() {
        let mut session = admin_session();
        assert!(!session.is_superadmin());

        session.user.role = Role::Superadmin;
        assert!(session.is_superadmin());
    }

    #[test]
    fn test_organization_scoping() {
        let session = admin_session();
        assert_eq!(session.organization_id(), Some(&OrgId::new("org_1")));
    }

    #[test]
    fn test_with_tokens_preserves_identity() {
        let session = admin_session();
        let refreshed = session
            .clone()
            .with_tokens("access-2".to_owned(), "refresh-2".to_owned());

        assert_eq!(refreshed.user, session.user);
        assert_eq!(refreshed.organization, session.organization);
        assert_eq!(refreshed.access_token, "access-2");
        assert_eq!(refreshed.refresh_token, "refresh-2");
    }

    #[test]
    fn test_serde_roundtrip_reproduces_identical_session() {
        let session = admin_session();
        let json = serde_json::to_string(&session).unwrap();
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
        assert_eq!(restored.is_superadmin(), session.is_superadmin());
    }

    #[test]
    fn test_persisted_shape_is_camel_case() {
        let session = admin_session();
        let value = serde_json::to_value(&session).unwrap();
        assert!(value.get("accessToken").is_some());
        assert!(value.get("refreshToken").is_some());
        assert!(value.get("access_token").is_none());
    }
}
