//! Profile and password commands for the signed-in admin.

use hwa_console::api::ProfileUpdate;
use hwa_core::Email;
use secrecy::SecretString;

use super::CliError;

/// Apply a partial profile update.
pub async fn update(name: Option<String>, email: Option<String>) -> Result<(), CliError> {
    let email = email.map(|raw| Email::parse(&raw)).transpose()?;

    let service = super::service().await?;
    if !service.is_authenticated().await {
        return Err(CliError::NotSignedIn);
    }

    let session = service.update_profile(ProfileUpdate { name, email }).await?;
    tracing::info!(
        "Profile updated: {} <{}>",
        session.user.name,
        session.user.email
    );
    Ok(())
}

/// Change the password, prompting for current and new.
pub async fn passwd() -> Result<(), CliError> {
    let service = super::service().await?;
    if !service.is_authenticated().await {
        return Err(CliError::NotSignedIn);
    }

    let current = SecretString::from(super::prompt("Current password")?);
    let new = SecretString::from(super::prompt("New password")?);
    let confirm = SecretString::from(super::prompt("Confirm new password")?);

    service.change_password(&current, &new, &confirm).await?;
    tracing::info!("Password changed");
    Ok(())
}
