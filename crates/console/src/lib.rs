//! HiredWithAndi admin console - session & access controller.
//!
//! This crate owns the authenticated-identity lifecycle for the admin
//! console: the two-step login flow (email check, then password or
//! first-time password setup), logout, profile updates, password
//! changes, transparent token refresh, and role-based view gating.
//!
//! # Architecture
//!
//! - [`api`] - Typed client for the identity service's REST API
//! - [`auth`] - The [`auth::AuthService`] controller and the
//!   [`auth::LoginFlow`] state machine driving the login screen
//! - [`session`] - Injectable session persistence (file-backed in the
//!   CLI, in-memory for tests and embedding)
//! - [`access`] - Which console views each role may see
//!
//! The controller is a pure client: all identity decisions except local
//! pre-validation belong to the external identity service. A session
//! survives restarts by being persisted whole to a single storage slot;
//! every mutation overwrites the entire record.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod access;
pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;

pub use access::{ConsoleView, ViewAccess};
pub use api::ApiClient;
pub use auth::{AuthService, LoginFlow, LoginState};
pub use config::ConsoleConfig;
pub use error::AuthError;
pub use session::{FileSessionStore, MemorySessionStore, SessionStore};
