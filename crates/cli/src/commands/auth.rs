//! Sign-in, sign-out, and session inspection commands.

use hwa_console::{LoginFlow, LoginState, access};
use hwa_core::Email;
use secrecy::SecretString;

use super::CliError;

/// Run the two-step login flow for an email address.
pub async fn login(email: &str) -> Result<(), CliError> {
    let email = Email::parse(email)?;
    let service = super::service().await?;

    let mut flow = LoginFlow::new(service);
    let state = flow.submit_email(email).await?;

    let label = match state {
        LoginState::EmailChecked {
            has_password: false,
            ..
        } => {
            tracing::info!("No password set yet - choose one to activate the account");
            "New password"
        }
        _ => "Password",
    };

    let password = SecretString::from(super::prompt(label)?);
    let session = flow.submit_password(&password).await?;

    tracing::info!(
        "Signed in as {} ({})",
        session.user.name,
        session.user.role
    );
    if let Some(org) = &session.organization {
        tracing::info!("Organization: {}", org.name);
    }
    Ok(())
}

/// Clear the session. Succeeds whether or not one exists.
pub async fn logout() -> Result<(), CliError> {
    let service = super::service().await?;
    service.logout().await;
    tracing::info!("Signed out");
    Ok(())
}

/// Show the current session and the views its role can open.
#[allow(clippy::print_stdout)]
pub async fn whoami() -> Result<(), CliError> {
    let service = super::service().await?;
    let session = service.session().await.ok_or(CliError::NotSignedIn)?;

    println!("{} <{}>", session.user.name, session.user.email);
    println!("role: {}", session.user.role);
    match &session.organization {
        Some(org) => println!("organization: {} ({})", org.name, org.id),
        None => println!("organization: (platform-wide)"),
    }

    let views: Vec<&str> = access::navigation(session.role())
        .iter()
        .map(|view| view.path())
        .collect();
    println!("views: {}", views.join(" "));
    Ok(())
}
