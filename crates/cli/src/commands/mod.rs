//! CLI command implementations.

use hwa_console::config::ConfigError;
use hwa_console::{ApiClient, AuthService, ConsoleConfig, FileSessionStore};
use hwa_core::EmailError;
use thiserror::Error;

pub mod auth;
pub mod profile;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The controller rejected the operation.
    #[error(transparent)]
    Auth(#[from] hwa_console::AuthError),

    /// An entered email is structurally invalid.
    #[error("Invalid email: {0}")]
    Email(#[from] EmailError),

    /// Reading from the terminal failed.
    #[error("Terminal error: {0}")]
    Io(#[from] std::io::Error),

    /// No active session where one is required.
    #[error("Not signed in - run `hwa login` first")]
    NotSignedIn,
}

impl CliError {
    /// The message shown to the user on failure.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Auth(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Build the controller from the environment and pick up any session
/// persisted by a previous run.
pub(crate) async fn service() -> Result<AuthService, CliError> {
    let config = ConsoleConfig::from_env()?;
    let store = FileSessionStore::new(config.session_file.clone());
    let service = AuthService::new(ApiClient::new(&config), store);
    service.hydrate().await;
    Ok(service)
}

/// Prompt on stderr and read one trimmed line from stdin.
pub(crate) fn prompt(label: &str) -> Result<String, CliError> {
    use std::io::{BufRead, Write};

    let mut stderr = std::io::stderr();
    write!(stderr, "{label}: ")?;
    stderr.flush()?;

    let mut line = String::new();
    std::io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
