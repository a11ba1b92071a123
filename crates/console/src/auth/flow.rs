//! The two-step login flow driven by the login screen.

use hwa_core::{Email, Session};
use secrecy::SecretString;

use crate::error::AuthError;

use super::AuthService;

/// Where the login screen currently is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginState {
    /// Nothing entered yet.
    AnonymousNoEmail,
    /// The identity service confirmed the account exists; waiting for
    /// either the password or, for accounts provisioned without one, a
    /// first-time password.
    EmailChecked {
        /// The confirmed email.
        email: Email,
        /// Whether a password has already been set.
        has_password: bool,
    },
    /// Logged in. Terminal until logout.
    Authenticated,
}

/// State machine for the email-first login screen.
///
/// Transitions only on confirmed outcomes: a failed email check or a
/// rejected password leaves the state where it was, with the error
/// surfaced to the caller for display.
pub struct LoginFlow {
    service: AuthService,
    state: LoginState,
}

impl LoginFlow {
    /// Start a flow in [`LoginState::AnonymousNoEmail`].
    #[must_use]
    pub const fn new(service: AuthService) -> Self {
        Self {
            service,
            state: LoginState::AnonymousNoEmail,
        }
    }

    /// The current state.
    #[must_use]
    pub const fn state(&self) -> &LoginState {
        &self.state
    }

    /// Submit the email step.
    ///
    /// Moves to [`LoginState::EmailChecked`] only when the identity
    /// service confirms the account exists; otherwise the flow stays in
    /// [`LoginState::AnonymousNoEmail`] and the error is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] for an unknown account.
    pub async fn submit_email(&mut self, email: Email) -> Result<&LoginState, AuthError> {
        let status = self.service.check_email(&email).await?;
        if !status.exists {
            return Err(AuthError::NotFound);
        }

        self.state = LoginState::EmailChecked {
            email,
            has_password: status.has_password,
        };
        Ok(&self.state)
    }

    /// Submit the password step.
    ///
    /// Attempts login when a password exists, first-time password setup
    /// otherwise. Success moves to [`LoginState::Authenticated`];
    /// failure keeps the flow on the password step.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when called before the email
    /// step, otherwise whatever the attempted operation failed with.
    pub async fn submit_password(
        &mut self,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        let LoginState::EmailChecked {
            email,
            has_password,
        } = &self.state
        else {
            return Err(AuthError::Validation("enter your email first".to_owned()));
        };

        let session = if *has_password {
            self.service.login(email, password).await?
        } else {
            self.service.setup_password(email, password).await?
        };

        self.state = LoginState::Authenticated;
        Ok(session)
    }

    /// Log out and reset to [`LoginState::AnonymousNoEmail`].
    pub async fn reset(&mut self) {
        self.service.logout().await;
        self.state = LoginState::AnonymousNoEmail;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::config::ConsoleConfig;
    use crate::session::MemorySessionStore;

    fn offline_flow() -> LoginFlow {
        let config = ConsoleConfig::for_endpoint(
            url::Url::parse("http://127.0.0.1:9/api").unwrap(),
            std::path::PathBuf::from("/tmp/unused.json"),
        );
        let service = AuthService::new(ApiClient::new(&config), MemorySessionStore::new());
        LoginFlow::new(service)
    }

    #[test]
    fn test_flow_starts_anonymous() {
        let flow = offline_flow();
        assert_eq!(*flow.state(), LoginState::AnonymousNoEmail);
    }

    #[tokio::test]
    async fn test_password_before_email_is_rejected_locally() {
        let mut flow = offline_flow();
        let err = flow
            .submit_password(&SecretString::from("User#123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
        assert_eq!(*flow.state(), LoginState::AnonymousNoEmail);
    }

    #[tokio::test]
    async fn test_reset_returns_to_anonymous() {
        let mut flow = offline_flow();
        flow.state = LoginState::Authenticated;
        flow.reset().await;
        assert_eq!(*flow.state(), LoginState::AnonymousNoEmail);
    }
}
