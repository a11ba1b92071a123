//! HiredWithAndi CLI - console client for the platform API.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (prompts for the password, or a first-time password for
//! # accounts provisioned without one)
//! hwa login -e admin@org.com
//!
//! # Show the current session and the views it can open
//! hwa whoami
//!
//! # Update the signed-in profile
//! hwa profile update --name "New Name"
//!
//! # Change the password (prompts for current and new)
//! hwa passwd
//!
//! # Sign out
//! hwa logout
//! ```
//!
//! # Environment Variables
//!
//! - `HWA_API_URL` - Base URL of the platform REST API (required)
//! - `HWA_SESSION_FILE` - Persisted session path (optional)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hwa")]
#[command(author, version, about = "HiredWithAndi admin console CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign in to the admin console
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,
    },
    /// Sign out and clear the persisted session
    Logout,
    /// Show the current session
    Whoami,
    /// Manage the signed-in profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },
    /// Change the account password
    Passwd,
}

#[derive(Subcommand)]
enum ProfileAction {
    /// Update name and/or email
    Update {
        /// New display name
        #[arg(short, long)]
        name: Option<String>,

        /// New login email
        #[arg(short, long)]
        email: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("{}", e.user_message());
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Login { email } => commands::auth::login(&email).await,
        Commands::Logout => commands::auth::logout().await,
        Commands::Whoami => commands::auth::whoami().await,
        Commands::Profile {
            action: ProfileAction::Update { name, email },
        } => commands::profile::update(name, email).await,
        Commands::Passwd => commands::profile::passwd().await,
    }
}
