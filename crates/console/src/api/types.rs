//! Wire types for the identity endpoints.
//!
//! Field names are camelCase on the wire only; everything the rest of
//! the crate touches is snake_case Rust.

use hwa_core::{Email, OrganizationRef, User};
use serde::{Deserialize, Serialize};

/// Request body for `POST auth/check-email`.
#[derive(Debug, Serialize)]
pub(crate) struct CheckEmailRequest<'a> {
    pub email: &'a str,
}

/// What the identity service knows about an email address.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailStatus {
    /// Whether the email belongs to a known user.
    pub exists: bool,
    /// Whether that user has already set a password. Accounts
    /// provisioned by a superadmin start without one.
    pub has_password: bool,
}

/// Request body for `POST auth/login` and `POST auth/setup-password`.
#[derive(Debug, Serialize)]
pub(crate) struct CredentialsRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// Request body for `POST auth/refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct RefreshRequest<'a> {
    pub refresh_token: &'a str,
}

/// Request body for `POST auth/change-password`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ChangePasswordRequest<'a> {
    pub current_password: &'a str,
    pub new_password: &'a str,
}

/// Successful auth payload: `{user, token, refreshToken}`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthPayload {
    pub user: AuthUser,
    pub token: String,
    pub refresh_token: String,
}

/// The user object inside an auth payload. Org admins carry their
/// organization inline; superadmins have none.
#[derive(Debug, Deserialize)]
pub(crate) struct AuthUser {
    #[serde(flatten)]
    pub user: User,
    #[serde(default)]
    pub organization: Option<OrganizationRef>,
}

/// Partial update sent to `PATCH profile`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProfileUpdate {
    /// New display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New login email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<Email>,
}

impl ProfileUpdate {
    /// Whether the update carries no fields at all.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none()
    }
}

/// Updated user fields returned by `PATCH profile`.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct UpdatedProfile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<Email>,
}
