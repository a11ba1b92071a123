//! Session persistence across restarts.

#![allow(clippy::unwrap_used)]

use hwa_console::{FileSessionStore, SessionStore};
use hwa_core::Email;
use hwa_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, MockPlatform};
use secrecy::SecretString;

fn temp_session_file(name: &str) -> FileSessionStore {
    let path = std::env::temp_dir()
        .join(format!("hwa-it-{name}-{}", std::process::id()))
        .join("hwa_admin_session.json");
    FileSessionStore::new(path)
}

#[tokio::test]
async fn test_session_survives_a_restart() {
    let platform = MockPlatform::spawn().await;
    let store = temp_session_file("restart");
    store.clear().unwrap();

    let session = {
        let service = platform.service_with_store(store.clone()).await;
        service
            .login(
                &Email::parse(ADMIN_EMAIL).unwrap(),
                &SecretString::from(ADMIN_PASSWORD),
            )
            .await
            .unwrap()
    };

    // A fresh controller over the same slot restores the identical
    // session, role flags and organization reference included.
    let restored = platform.service_with_store(store.clone()).await;
    let hydrated = restored.session().await.unwrap();
    assert_eq!(hydrated, session);
    assert_eq!(hydrated.is_superadmin(), session.is_superadmin());
    assert_eq!(hydrated.organization_id(), session.organization_id());

    store.clear().unwrap();
}

#[tokio::test]
async fn test_logout_clears_the_slot_for_future_runs() {
    let platform = MockPlatform::spawn().await;
    let store = temp_session_file("logout");
    store.clear().unwrap();

    let service = platform.service_with_store(store.clone()).await;
    service
        .login(
            &Email::parse(ADMIN_EMAIL).unwrap(),
            &SecretString::from(ADMIN_PASSWORD),
        )
        .await
        .unwrap();

    service.logout().await;
    // Idempotent: a second logout is a no-op.
    service.logout().await;

    let next_run = platform.service_with_store(store).await;
    assert!(next_run.session().await.is_none());
}
