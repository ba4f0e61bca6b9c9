//! Login, credential persistence and logout against the mock API.

#![allow(clippy::unwrap_used)]

use product_desk_client::{AuthError, Desk};
use product_desk_integration_tests::{MockApi, TOKEN};

#[tokio::test]
async fn test_login_persists_token_across_restarts() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = api.config(dir.path().join("token"));

    let desk = Desk::from_config(&config).unwrap();
    assert!(!desk.auth().snapshot().is_authenticated());
    desk.auth().login("ops@shop.test").await.unwrap();

    assert_eq!(std::fs::read_to_string(&config.token_file).unwrap(), TOKEN);

    let restarted = Desk::from_config(&config).unwrap();
    assert!(restarted.auth().snapshot().is_authenticated());
    assert_eq!(restarted.auth().credential().unwrap().expose(), TOKEN);
}

#[tokio::test]
async fn test_logout_removes_token_file() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = api.config(dir.path().join("token"));
    let desk = Desk::from_config(&config).unwrap();
    desk.auth().login("ops@shop.test").await.unwrap();

    desk.auth().logout().unwrap();

    assert!(!config.token_file.exists());
    assert!(!Desk::from_config(&config).unwrap().auth().snapshot().is_authenticated());
}

#[tokio::test]
async fn test_login_rejection_surfaces_server_message() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().unwrap();
    let config = api.config(dir.path().join("token"));
    let desk = Desk::from_config(&config).unwrap();
    api.respond_next(404, r#"{"message":"User not found"}"#);

    let err = desk.auth().login("ghost@shop.test").await.unwrap_err();

    assert!(matches!(err, AuthError::Api(_)));
    let state = desk.auth().snapshot();
    assert_eq!(state.error.as_deref(), Some("User not found"));
    assert!(!state.loading);
    assert!(!config.token_file.exists());
}

#[tokio::test]
async fn test_login_without_message_uses_fallback() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().unwrap();
    let desk = Desk::from_config(&api.config(dir.path().join("token"))).unwrap();
    api.respond_next(500, "");

    assert!(desk.auth().login("ops@shop.test").await.is_err());
    assert_eq!(desk.auth().snapshot().error.as_deref(), Some("Login failed"));
}

#[tokio::test]
async fn test_malformed_email_is_rejected_locally() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().unwrap();
    let desk = Desk::from_config(&api.config(dir.path().join("token"))).unwrap();

    let err = desk.auth().login("no-at-sign").await.unwrap_err();

    assert!(matches!(err, AuthError::InvalidEmail(_)));
    assert!(api.requests().is_empty());
}

#[tokio::test]
async fn test_login_sends_no_bearer_header() {
    let api = MockApi::start().await;
    let dir = tempfile::tempdir().unwrap();
    let desk = Desk::from_config(&api.config(dir.path().join("token"))).unwrap();

    desk.auth().login("ops@shop.test").await.unwrap();

    let requests = api.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests.first().map(|r| r.path.as_str()), Some("/auth"));
    assert!(requests.first().unwrap().authorization.is_none());
}
