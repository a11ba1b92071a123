//! The session & access controller.
//!
//! [`AuthService`] mediates every identity transition - login, password
//! setup, logout, profile update, password change, token refresh - and
//! answers "is there a valid logged-in admin". It owns the single
//! in-memory session and the persisted slot behind it; nothing else in
//! the console writes either.

use std::sync::Arc;

use hwa_core::{Email, Session};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::RwLock;
use tracing::instrument;

use crate::api::types::{
    AuthPayload, ChangePasswordRequest, CheckEmailRequest, CredentialsRequest, RefreshRequest,
    UpdatedProfile,
};
use crate::api::{ApiClient, ApiError, EmailStatus, ProfileUpdate, endpoints};
use crate::error::AuthError;
use crate::session::SessionStore;

mod flow;

pub use flow::{LoginFlow, LoginState};

/// Minimum accepted password length, checked locally before any request.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// The session & access controller.
///
/// Cheap to clone; clones share the same session state. Failed
/// operations never corrupt the persisted session - a failed profile
/// update or password change leaves the prior record untouched.
#[derive(Clone)]
pub struct AuthService {
    inner: Arc<AuthServiceInner>,
}

struct AuthServiceInner {
    api: ApiClient,
    store: Box<dyn SessionStore>,
    /// The single active session. Last write wins; there is no
    /// cross-process locking on the persisted slot.
    session: RwLock<Option<Session>>,
}

impl AuthService {
    /// Create a controller over an API client and a session store.
    ///
    /// Call [`AuthService::hydrate`] afterwards to pick up a session
    /// persisted by a previous run.
    pub fn new(api: ApiClient, store: impl SessionStore + 'static) -> Self {
        Self {
            inner: Arc::new(AuthServiceInner {
                api,
                store: Box::new(store),
                session: RwLock::new(None),
            }),
        }
    }

    /// Load the persisted session into memory, if one exists.
    ///
    /// A corrupt or unreadable slot behaves as "not logged in": the
    /// failure is logged and ignored, never fatal.
    pub async fn hydrate(&self) -> Option<Session> {
        match self.inner.store.load() {
            Ok(Some(session)) => {
                *self.inner.session.write().await = Some(session.clone());
                Some(session)
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "Ignoring unreadable session slot");
                None
            }
        }
    }

    /// The current session, if any.
    pub async fn session(&self) -> Option<Session> {
        self.inner.session.read().await.clone()
    }

    /// Whether an admin is currently logged in.
    pub async fn is_authenticated(&self) -> bool {
        self.inner.session.read().await.is_some()
    }

    /// Ask the identity service whether an email belongs to a known
    /// user and whether a password has been set for it.
    ///
    /// Drives the first step of the two-step login flow.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NotFound`] for an unknown email.
    #[instrument(skip(self), fields(email = %email))]
    pub async fn check_email(&self, email: &Email) -> Result<EmailStatus, AuthError> {
        let body = CheckEmailRequest {
            email: email.as_str(),
        };
        let status: EmailStatus = self
            .inner
            .api
            .post(endpoints::CHECK_EMAIL, &body, None)
            .await
            .map_err(|e| match e {
                ApiError::Service { status: 404, .. } => AuthError::NotFound,
                other => AuthError::Api(other),
            })?;
        Ok(status)
    }

    /// Authenticate with email and password.
    ///
    /// The console is admin-only: valid credentials belonging to a
    /// regular member are rejected with [`AuthError::Unauthorized`] and
    /// nothing is persisted.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::InvalidCredentials`] when the service
    /// rejects the credentials.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn login(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        let body = CredentialsRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let payload: AuthPayload = self
            .inner
            .api
            .post(endpoints::LOGIN, &body, None)
            .await
            .map_err(|e| match e {
                ApiError::Unauthenticated => AuthError::InvalidCredentials,
                ApiError::Service { status: 400, .. } => AuthError::InvalidCredentials,
                ApiError::Service { status: 404, .. } => AuthError::NotFound,
                other => AuthError::Api(other),
            })?;

        self.admit(payload).await
    }

    /// Establish the initial password for an account provisioned
    /// without one, and log in with it.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] when the service rejects the
    /// chosen password.
    #[instrument(skip(self, password), fields(email = %email))]
    pub async fn setup_password(
        &self,
        email: &Email,
        password: &SecretString,
    ) -> Result<Session, AuthError> {
        validate_new_password(password)?;

        let body = CredentialsRequest {
            email: email.as_str(),
            password: password.expose_secret(),
        };
        let payload: AuthPayload = self
            .inner
            .api
            .post(endpoints::SETUP_PASSWORD, &body, None)
            .await
            .map_err(|e| match e {
                ApiError::Service {
                    status: 400 | 422,
                    message,
                } => AuthError::Validation(message),
                ApiError::Service { status: 404, .. } => AuthError::NotFound,
                other => AuthError::Api(other),
            })?;

        self.admit(payload).await
    }

    /// Clear the in-memory and persisted session unconditionally.
    ///
    /// Idempotent and infallible: a storage failure is logged, never
    /// surfaced.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        *self.inner.session.write().await = None;
        if let Err(e) = self.inner.store.clear() {
            tracing::warn!(error = %e, "Failed to clear persisted session");
        }
    }

    /// Apply a partial update to the current identity.
    ///
    /// Goes through the refresh-retry protocol, merges the returned
    /// fields into the existing session preserving the token pair, and
    /// persists the result. On failure the prior session - in memory
    /// and on disk - is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Conflict`] when the service rejects the
    /// update (e.g., email already in use).
    #[instrument(skip(self, update))]
    pub async fn update_profile(&self, update: ProfileUpdate) -> Result<Session, AuthError> {
        if update.is_empty() {
            return Err(AuthError::Validation("nothing to update".to_owned()));
        }

        let body = serde_json::to_value(&update).map_err(ApiError::Parse)?;
        let data = self
            .authorized_json(reqwest::Method::PATCH, endpoints::PROFILE, Some(body))
            .await
            .map_err(|e| match e {
                AuthError::Api(ApiError::Service {
                    status: 400 | 409 | 422,
                    message,
                }) => AuthError::Conflict(message),
                other => other,
            })?;
        let updated: UpdatedProfile = serde_json::from_value(data).map_err(ApiError::Parse)?;

        // Read the session only now: the refresh-retry path may have
        // rotated the token pair while the request was in flight, and
        // the merge must build on the fresh pair.
        let current = self.session().await.ok_or(AuthError::Unauthorized)?;

        let mut user = current.user.clone();
        if let Some(name) = updated.name {
            user.name = name;
        }
        if let Some(email) = updated.email {
            user.email = email;
        }

        let session = current.with_user(user);
        self.persist(session.clone()).await?;
        Ok(session)
    }

    /// Change the current password.
    ///
    /// Confirmation equality and the minimum length are validated
    /// locally; when either check fails the identity service is never
    /// called. The service remains the authority on whether the current
    /// password is correct.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Validation`] for local pre-check failures
    /// and [`AuthError::InvalidCurrentPassword`] when the service
    /// rejects the current password.
    #[instrument(skip_all)]
    pub async fn change_password(
        &self,
        current: &SecretString,
        new: &SecretString,
        confirm: &SecretString,
    ) -> Result<(), AuthError> {
        if new.expose_secret() != confirm.expose_secret() {
            return Err(AuthError::Validation("passwords do not match".to_owned()));
        }
        validate_new_password(new)?;

        let session = self.session().await.ok_or(AuthError::Unauthorized)?;
        let body = ChangePasswordRequest {
            current_password: current.expose_secret(),
            new_password: new.expose_secret(),
        };
        self.inner
            .api
            .post_unit(
                endpoints::CHANGE_PASSWORD,
                &body,
                Some(&session.access_token),
            )
            .await
            .map_err(|e| match e {
                ApiError::Unauthenticated => AuthError::InvalidCurrentPassword,
                ApiError::Service {
                    status: 400 | 422,
                    message,
                } => AuthError::Validation(message),
                other => AuthError::Api(other),
            })
    }

    /// Exchange the stored refresh token for a new token pair.
    ///
    /// On failure the session is cleared - a forced logout - before
    /// [`AuthError::RefreshFailed`] is returned.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::RefreshFailed`] if there is no session or
    /// the exchange is rejected.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<Session, AuthError> {
        let Some(current) = self.session().await else {
            return Err(AuthError::RefreshFailed);
        };

        let body = RefreshRequest {
            refresh_token: &current.refresh_token,
        };
        let payload: Result<AuthPayload, ApiError> =
            self.inner.api.post(endpoints::REFRESH, &body, None).await;

        match payload {
            Ok(payload) => {
                let session = current.with_tokens(payload.token, payload.refresh_token);
                self.persist(session.clone()).await?;
                Ok(session)
            }
            Err(e) => {
                tracing::warn!(error = %e, "Token refresh failed, clearing session");
                self.logout().await;
                Err(AuthError::RefreshFailed)
            }
        }
    }

    /// Execute an authenticated request with the retry-once-on-401
    /// protocol.
    ///
    /// When the service answers unauthenticated for a non-`auth/` path
    /// that has not yet been retried, exactly one [`AuthService::refresh`]
    /// is attempted and the request is re-sent once with the new token.
    /// If the refresh fails the session is cleared and the original
    /// unauthenticated error propagates. The explicit `retried` flag
    /// bounds the loop to a single retry.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Unauthorized`] when no session is active,
    /// otherwise the mapped service error.
    #[instrument(skip(self, body), fields(path = %path))]
    pub async fn authorized_json(
        &self,
        method: reqwest::Method,
        path: &str,
        body: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, AuthError> {
        let mut retried = false;

        loop {
            let token = self
                .session()
                .await
                .ok_or(AuthError::Unauthorized)?
                .access_token;

            let result = self
                .inner
                .api
                .request_json(method.clone(), path, body.as_ref(), Some(&token))
                .await;

            match result {
                Err(ApiError::Unauthenticated)
                    if !retried && !ApiClient::is_auth_path(path) =>
                {
                    retried = true;
                    if self.refresh().await.is_err() {
                        // Forced logout already happened; the original
                        // unauthenticated error propagates to the caller.
                        return Err(AuthError::Api(ApiError::Unauthenticated));
                    }
                }
                other => return other.map_err(AuthError::from),
            }
        }
    }

    /// Gate an auth payload on role, then persist it as the session.
    async fn admit(&self, payload: AuthPayload) -> Result<Session, AuthError> {
        if !payload.user.user.role.can_use_console() {
            return Err(AuthError::Unauthorized);
        }

        let session = Session::new(
            payload.user.user,
            payload.user.organization,
            payload.token,
            payload.refresh_token,
        );
        self.persist(session.clone()).await?;
        Ok(session)
    }

    /// Overwrite the persisted slot, then the in-memory session.
    ///
    /// Store-first ordering keeps memory untouched when the write
    /// fails, so a failed mutation leaves the prior state intact.
    async fn persist(&self, session: Session) -> Result<(), AuthError> {
        self.inner.store.save(&session)?;
        *self.inner.session.write().await = Some(session);
        Ok(())
    }
}

fn validate_new_password(password: &SecretString) -> Result<(), AuthError> {
    if password.expose_secret().len() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::ConsoleConfig;
    use crate::session::MemorySessionStore;
    use hwa_core::{OrgId, OrganizationRef, Role, User, UserId};

    // Points at an endpoint no test ever reaches: these tests assert
    // that local validation short-circuits before any request is made.
    fn offline_service(store: MemorySessionStore) -> AuthService {
        let config = ConsoleConfig::for_endpoint(
            url::Url::parse("http://127.0.0.1:9/api").unwrap(),
            std::path::PathBuf::from("/tmp/unused.json"),
        );
        AuthService::new(ApiClient::new(&config), store)
    }

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

    #[tokio::test]
    async fn test_change_password_mismatch_never_calls_service() {
        let service = offline_service(MemorySessionStore::with_session(admin_session()));
        service.hydrate().await;

        let err = service
            .change_password(
                &SecretString::from("old-password"),
                &SecretString::from("new-password"),
                &SecretString::from("different"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_change_password_too_short_never_calls_service() {
        let service = offline_service(MemorySessionStore::with_session(admin_session()));
        service.hydrate().await;

        let err = service
            .change_password(
                &SecretString::from("old-password"),
                &SecretString::from("abc"),
                &SecretString::from("abc"),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_empty_profile_update_is_rejected_locally() {
        let service = offline_service(MemorySessionStore::with_session(admin_session()));
        service.hydrate().await;

        let err = service
            .update_profile(ProfileUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AuthError::Validation(_)));
    }

    #[tokio::test]
    async fn test_hydrate_restores_persisted_session() {
        let session = admin_session();
        let service = offline_service(MemorySessionStore::with_session(session.clone()));

        assert!(!service.is_authenticated().await);
        assert_eq!(service.hydrate().await, Some(session.clone()));
        assert_eq!(service.session().await, Some(session));
    }

    #[tokio::test]
    async fn test_logout_is_idempotent() {
        let service = offline_service(MemorySessionStore::with_session(admin_session()));
        service.hydrate().await;
        assert!(service.is_authenticated().await);

        service.logout().await;
        assert!(!service.is_authenticated().await);

        service.logout().await;
        assert!(!service.is_authenticated().await);
    }

    #[tokio::test]
    async fn test_refresh_without_session_fails() {
        let service = offline_service(MemorySessionStore::new());
        let err = service.refresh().await.unwrap_err();
        assert!(matches!(err, AuthError::RefreshFailed));
    }
}
