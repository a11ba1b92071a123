//! Controller-level error taxonomy.
//!
//! Every identity-service failure is caught at the controller boundary
//! and converted into one of these variants; callers render
//! [`AuthError::user_message`] instead of crashing.

use thiserror::Error;

use crate::api::ApiError;
use crate::session::StoreError;

/// Errors surfaced by the session & access controller.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The email does not belong to a known account.
    #[error("No account found for that email")]
    NotFound,

    /// The identity service rejected the credentials.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// A password change was rejected because the current password was
    /// wrong.
    #[error("Current password is incorrect")]
    InvalidCurrentPassword,

    /// Valid credentials, but the role has no console access.
    #[error("This console is restricted to organization admins")]
    Unauthorized,

    /// A local pre-check failed before any request was made.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// Server-side uniqueness/validation failure on profile update.
    #[error("Update rejected: {0}")]
    Conflict(String),

    /// The refresh token could not be exchanged. The session has
    /// already been cleared (forced logout) by the time this is seen.
    #[error("Session expired, please sign in again")]
    RefreshFailed,

    /// Transport or unexpected identity-service failure.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The persisted session slot could not be read or written.
    #[error("Session storage error: {0}")]
    Store(#[from] StoreError),
}

impl AuthError {
    /// The message shown in the console's notification toast.
    ///
    /// Structured service messages are passed through where present;
    /// transport failures collapse to a generic fallback.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Api(ApiError::Service { message, .. }) => message.clone(),
            Self::Api(_) | Self::Store(_) => "Something went wrong, please try again".to_owned(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_passes_service_message_through() {
        let err = AuthError::Api(ApiError::Service {
            status: 409,
            message: "Email already in use".to_owned(),
        });
        assert_eq!(err.user_message(), "Email already in use");
    }

    #[test]
    fn test_user_message_generic_fallback_for_transport() {
        let err = AuthError::Api(ApiError::MissingData);
        assert_eq!(err.user_message(), "Something went wrong, please try again");
    }

    #[test]
    fn test_taxonomy_display() {
        assert_eq!(
            AuthError::InvalidCredentials.to_string(),
            "Invalid email or password"
        );
        assert_eq!(
            AuthError::InvalidCurrentPassword.to_string(),
            "Current password is incorrect"
        );
        assert_eq!(
            AuthError::InvalidCurrentPassword.user_message(),
            "Current password is incorrect"
        );
        assert_eq!(
            AuthError::Validation("passwords do not match".to_owned()).to_string(),
            "Validation failed: passwords do not match"
        );
    }
}
