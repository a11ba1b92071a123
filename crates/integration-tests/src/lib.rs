//! Integration tests for the HiredWithAndi admin console.
//!
//! The controller is exercised against [`MockPlatform`], an in-process
//! axum rendition of the platform's identity endpoints, seeded with the
//! original demo fixtures (the `org_1` bootcamp, its admin, the global
//! superadmin, a regular member, and a provisioned account without a
//! password).
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p hwa-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::{get, patch, post};
use serde_json::{Value, json};

use hwa_console::{ApiClient, AuthService, ConsoleConfig, MemorySessionStore, SessionStore};

/// Seeded org admin (from the original demo fixtures).
pub const ADMIN_EMAIL: &str = "test@example.com";
/// Seeded org admin password.
pub const ADMIN_PASSWORD: &str = "User#123";
/// Seeded global superadmin.
pub const SUPERADMIN_EMAIL: &str = "superadmin@example.com";
/// Seeded global superadmin password.
pub const SUPERADMIN_PASSWORD: &str = "Superadmin#123";
/// Seeded regular member (no console access).
pub const MEMBER_EMAIL: &str = "alice@example.com";
/// Seeded member password.
pub const MEMBER_PASSWORD: &str = "Member#123";
/// Seeded account provisioned by a superadmin, no password yet.
pub const PROVISIONED_EMAIL: &str = "new.hire@org.com";

/// A platform account known to the mock identity service.
#[derive(Debug, Clone)]
struct MockUser {
    id: String,
    name: String,
    email: String,
    password: Option<String>,
    role: String,
    organization: Option<Value>,
}

impl MockUser {
    fn as_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "email": self.email,
            "role": self.role,
            "organization": self.organization,
        })
    }
}

/// Shared state of the mock identity service.
pub struct MockState {
    users: Mutex<Vec<MockUser>>,
    /// Live access tokens mapped to the owning user ID.
    access_tokens: Mutex<HashMap<String, String>>,
    /// Live refresh tokens mapped to the owning user ID. Rotation
    /// removes the old token, so a spent one cannot be replayed.
    refresh_tokens: Mutex<HashMap<String, String>>,
    token_seq: AtomicUsize,
    refresh_enabled: AtomicBool,
    /// Number of calls to `POST auth/refresh`.
    pub refresh_calls: AtomicUsize,
    /// Number of calls to the protected stats endpoint.
    pub stats_calls: AtomicUsize,
    /// Number of calls to `PATCH profile`.
    pub profile_calls: AtomicUsize,
    /// Number of calls to `POST auth/change-password`.
    pub change_password_calls: AtomicUsize,
}

impl MockState {
    fn seeded() -> Self {
        let org = json!({ "id": "org_1", "name": "LearnWithAndi Bootcamp" });
        let users = vec![
            MockUser {
                id: "admin_1".to_owned(),
                name: "Test".to_owned(),
                email: ADMIN_EMAIL.to_owned(),
                password: Some(ADMIN_PASSWORD.to_owned()),
                role: "admin".to_owned(),
                organization: Some(org.clone()),
            },
            MockUser {
                id: "super_1".to_owned(),
                name: "Global Superadmin".to_owned(),
                email: SUPERADMIN_EMAIL.to_owned(),
                password: Some(SUPERADMIN_PASSWORD.to_owned()),
                role: "superadmin".to_owned(),
                organization: None,
            },
            MockUser {
                id: "stu_1".to_owned(),
                name: "Alice Smith".to_owned(),
                email: MEMBER_EMAIL.to_owned(),
                password: Some(MEMBER_PASSWORD.to_owned()),
                role: "member".to_owned(),
                organization: Some(org.clone()),
            },
            MockUser {
                id: "admin_3".to_owned(),
                name: "New Hire".to_owned(),
                email: PROVISIONED_EMAIL.to_owned(),
                password: None,
                role: "admin".to_owned(),
                organization: Some(org),
            },
        ];

        Self {
            users: Mutex::new(users),
            access_tokens: Mutex::new(HashMap::new()),
            refresh_tokens: Mutex::new(HashMap::new()),
            token_seq: AtomicUsize::new(0),
            refresh_enabled: AtomicBool::new(true),
            refresh_calls: AtomicUsize::new(0),
            stats_calls: AtomicUsize::new(0),
            profile_calls: AtomicUsize::new(0),
            change_password_calls: AtomicUsize::new(0),
        }
    }

    /// Invalidate every live access token, as a server-side expiry
    /// would. Refresh tokens stay valid.
    pub fn expire_access_tokens(&self) {
        self.access_tokens.lock().unwrap().clear();
    }

    /// Make every subsequent refresh attempt fail.
    pub fn disable_refresh(&self) {
        self.refresh_enabled.store(false, Ordering::SeqCst);
    }

    fn issue_tokens(&self, user_id: &str) -> (String, String) {
        let n = self.token_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let access = format!("access-{n}");
        let refresh = format!("refresh-{n}");
        self.access_tokens
            .lock()
            .unwrap()
            .insert(access.clone(), user_id.to_owned());
        self.refresh_tokens
            .lock()
            .unwrap()
            .insert(refresh.clone(), user_id.to_owned());
        (access, refresh)
    }

    fn bearer_owner(&self, headers: &HeaderMap) -> Option<String> {
        let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
        let token = value.strip_prefix("Bearer ")?;
        self.access_tokens.lock().unwrap().get(token).cloned()
    }

    fn user_json(&self, user_id: &str) -> Option<Value> {
        let users = self.users.lock().unwrap();
        users.iter().find(|u| u.id == user_id).map(MockUser::as_json)
    }
}

/// The in-process identity service.
pub struct MockPlatform {
    /// API base URL, including the `/api` prefix.
    pub base_url: url::Url,
    /// Shared state, for assertions and fault injection.
    pub state: Arc<MockState>,
}

impl MockPlatform {
    /// Bind an ephemeral port and serve the seeded mock platform.
    pub async fn spawn() -> Self {
        let state = Arc::new(MockState::seeded());

        let router = axum::Router::new()
            .route("/api/auth/check-email", post(check_email))
            .route("/api/auth/login", post(login))
            .route("/api/auth/setup-password", post(setup_password))
            .route("/api/auth/refresh", post(refresh))
            .route("/api/auth/change-password", post(change_password))
            .route("/api/profile", patch(update_profile))
            .route("/api/stats/overview", get(stats_overview))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let base_url = url::Url::parse(&format!("http://{addr}/api")).unwrap();
        Self { base_url, state }
    }

    /// A controller backed by the given store, pointed at this platform.
    pub async fn service_with_store(&self, store: impl SessionStore + 'static) -> AuthService {
        let config = ConsoleConfig::for_endpoint(
            self.base_url.clone(),
            std::env::temp_dir().join("hwa-unused-session.json"),
        );
        let service = AuthService::new(ApiClient::new(&config), store);
        service.hydrate().await;
        service
    }

    /// A controller backed by a fresh in-memory store.
    pub async fn service(&self) -> AuthService {
        self.service_with_store(MemorySessionStore::new()).await
    }
}

type Reply = (StatusCode, Json<Value>);

fn data(value: Value) -> Reply {
    (StatusCode::OK, Json(json!({ "data": value })))
}

fn error(status: StatusCode, message: &str) -> Reply {
    (status, Json(json!({ "message": message })))
}

async fn check_email(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let users = state.users.lock().unwrap();

    users.iter().find(|u| u.email == email).map_or_else(
        || error(StatusCode::NOT_FOUND, "Account not found"),
        |user| {
            data(json!({
                "exists": true,
                "hasPassword": user.password.is_some(),
            }))
        },
    )
}

async fn login(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();

    let matched = {
        let users = state.users.lock().unwrap();
        users
            .iter()
            .find(|u| u.email == email && u.password.as_deref() == Some(password.as_str()))
            .map(|u| (u.id.clone(), u.as_json()))
    };

    matched.map_or_else(
        || error(StatusCode::UNAUTHORIZED, "Invalid email or password"),
        |(id, user)| {
            let (access, refresh) = state.issue_tokens(&id);
            data(json!({ "user": user, "token": access, "refreshToken": refresh }))
        },
    )
}

async fn setup_password(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Reply {
    let email = body["email"].as_str().unwrap_or_default().to_owned();
    let password = body["password"].as_str().unwrap_or_default().to_owned();

    let user = {
        let mut users = state.users.lock().unwrap();
        match users.iter_mut().find(|u| u.email == email) {
            Some(user) if user.password.is_none() => {
                user.password = Some(password);
                Some((user.id.clone(), user.as_json()))
            }
            Some(_) => {
                return error(StatusCode::BAD_REQUEST, "Password already set");
            }
            None => None,
        }
    };

    user.map_or_else(
        || error(StatusCode::NOT_FOUND, "Account not found"),
        |(id, user)| {
            let (access, refresh) = state.issue_tokens(&id);
            data(json!({ "user": user, "token": access, "refreshToken": refresh }))
        },
    )
}

async fn refresh(State(state): State<Arc<MockState>>, Json(body): Json<Value>) -> Reply {
    state.refresh_calls.fetch_add(1, Ordering::SeqCst);

    if !state.refresh_enabled.load(Ordering::SeqCst) {
        return error(StatusCode::UNAUTHORIZED, "Refresh token revoked");
    }

    let token = body["refreshToken"].as_str().unwrap_or_default().to_owned();
    let owner = state.refresh_tokens.lock().unwrap().remove(&token);

    owner.map_or_else(
        || error(StatusCode::UNAUTHORIZED, "Invalid refresh token"),
        |user_id| {
            let user = state.user_json(&user_id).unwrap_or(Value::Null);
            let (access, refresh) = state.issue_tokens(&user_id);
            data(json!({ "user": user, "token": access, "refreshToken": refresh }))
        },
    )
}

async fn change_password(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.change_password_calls.fetch_add(1, Ordering::SeqCst);

    let Some(user_id) = state.bearer_owner(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Not authenticated");
    };

    let current = body["currentPassword"].as_str().unwrap_or_default().to_owned();
    let new = body["newPassword"].as_str().unwrap_or_default().to_owned();

    let mut users = state.users.lock().unwrap();
    let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
        return error(StatusCode::UNAUTHORIZED, "Not authenticated");
    };

    if user.password.as_deref() != Some(current.as_str()) {
        return error(StatusCode::UNAUTHORIZED, "Current password is incorrect");
    }

    user.password = Some(new);
    data(Value::Null)
}

async fn update_profile(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Reply {
    state.profile_calls.fetch_add(1, Ordering::SeqCst);

    let Some(user_id) = state.bearer_owner(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Not authenticated");
    };

    let mut users = state.users.lock().unwrap();

    if let Some(new_email) = body["email"].as_str() {
        if users.iter().any(|u| u.email == new_email && u.id != user_id) {
            return error(StatusCode::CONFLICT, "Email already in use");
        }
    }

    let Some(user) = users.iter_mut().find(|u| u.id == user_id) else {
        return error(StatusCode::UNAUTHORIZED, "Not authenticated");
    };

    if let Some(name) = body["name"].as_str() {
        user.name = name.to_owned();
    }
    if let Some(new_email) = body["email"].as_str() {
        user.email = new_email.to_owned();
    }

    data(json!({ "name": user.name, "email": user.email }))
}

async fn stats_overview(State(state): State<Arc<MockState>>, headers: HeaderMap) -> Reply {
    state.stats_calls.fetch_add(1, Ordering::SeqCst);

    if state.bearer_owner(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Not authenticated");
    }

    data(json!({ "totalMembers": 42, "averageJfp": 76 }))
}
