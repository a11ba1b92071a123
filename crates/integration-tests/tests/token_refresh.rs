//! The retry-once-on-401 refresh protocol.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::Ordering;

use hwa_console::api::ApiError;
use hwa_console::{AuthError, AuthService};
use hwa_core::Email;
use hwa_integration_tests::{ADMIN_EMAIL, ADMIN_PASSWORD, MockPlatform};
use secrecy::SecretString;

async fn signed_in(platform: &MockPlatform) -> AuthService {
    let service = platform.service().await;
    service
        .login(
            &Email::parse(ADMIN_EMAIL).unwrap(),
            &SecretString::from(ADMIN_PASSWORD),
        )
        .await
        .unwrap();
    service
}

#[tokio::test]
async fn test_protected_request_carries_bearer_token() {
    let platform = MockPlatform::spawn().await;
    let service = signed_in(&platform).await;

    let stats = service
        .authorized_json(reqwest::Method::GET, "stats/overview", None)
        .await
        .unwrap();

    assert_eq!(stats["totalMembers"], 42);
    assert_eq!(platform.state.stats_calls.load(Ordering::SeqCst), 1);
    assert_eq!(platform.state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_expired_token_refreshes_once_and_retries_once() {
    let platform = MockPlatform::spawn().await;
    let service = signed_in(&platform).await;
    let before = service.session().await.unwrap();

    platform.state.expire_access_tokens();

    let stats = service
        .authorized_json(reqwest::Method::GET, "stats/overview", None)
        .await
        .unwrap();
    assert_eq!(stats["averageJfp"], 76);

    // One rejected attempt, one refresh, one retried attempt.
    assert_eq!(platform.state.stats_calls.load(Ordering::SeqCst), 2);
    assert_eq!(platform.state.refresh_calls.load(Ordering::SeqCst), 1);

    // The stored token pair was replaced, the identity kept.
    let after = service.session().await.unwrap();
    assert_ne!(after.access_token, before.access_token);
    assert_ne!(after.refresh_token, before.refresh_token);
    assert_eq!(after.user, before.user);
}

#[tokio::test]
async fn test_failed_refresh_forces_logout_and_propagates_original_error() {
    let platform = MockPlatform::spawn().await;
    let service = signed_in(&platform).await;

    platform.state.expire_access_tokens();
    platform.state.disable_refresh();

    let err = service
        .authorized_json(reqwest::Method::GET, "stats/overview", None)
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::Api(ApiError::Unauthenticated)));
    assert_eq!(platform.state.refresh_calls.load(Ordering::SeqCst), 1);
    // Exactly one request reached the endpoint: no retry without a
    // successful refresh.
    assert_eq!(platform.state.stats_calls.load(Ordering::SeqCst), 1);
    // Forced logout.
    assert!(service.session().await.is_none());
}

#[tokio::test]
async fn test_identity_endpoints_are_exempt_from_retry() {
    let platform = MockPlatform::spawn().await;
    let service = signed_in(&platform).await;

    platform.state.expire_access_tokens();

    // change-password is an auth path: the stale token surfaces as a
    // password failure, with no refresh attempt behind it.
    let err = service
        .change_password(
            &SecretString::from(ADMIN_PASSWORD),
            &SecretString::from("NewPass#1"),
            &SecretString::from("NewPass#1"),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AuthError::InvalidCurrentPassword));
    assert_eq!(platform.state.refresh_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_manual_refresh_rotates_the_token_pair() {
    let platform = MockPlatform::spawn().await;
    let service = signed_in(&platform).await;
    let before = service.session().await.unwrap();

    let after = service.refresh().await.unwrap();

    assert_ne!(after.refresh_token, before.refresh_token);
    assert_eq!(after.user, before.user);
    assert_eq!(after.organization, before.organization);
    assert_eq!(service.session().await, Some(after));
}
