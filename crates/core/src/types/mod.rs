//! Core type definitions.

pub mod email;
pub mod id;
pub mod role;
pub mod session;
pub mod user;

pub use email::{Email, EmailError};
pub use id::{OrgId, UserId};
pub use role::Role;
pub use session::Session;
pub use user::{OrganizationRef, User};
