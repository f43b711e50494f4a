//! Integration tests for the authorized request pipeline and token refresh.

mod helpers;

use std::time::Duration;

use helpers::{MockBackend, RefreshMode, TestClient};
use jewelbox_auth::{MemoryTokenStore, SessionError};
use jewelbox_client::{ApiError, JewelboxClient};
use jewelbox_core::config::{AppConfig, StorageBackend};
use jewelbox_core::types::TokenPair;

#[tokio::test]
async fn test_sign_in_stores_pair_with_expiry() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());

    t.sign_in().await;

    let pair = t.client.tokens().current_tokens().unwrap();
    assert_eq!(pair.access_token, "A1");
    assert_eq!(pair.refresh_token, "R1");
    assert_eq!(pair.user_id, helpers::USER_ID);
    assert_eq!(
        pair.access_token_expiry,
        helpers::t0() + chrono::Duration::seconds(900)
    );
    assert_eq!(t.stored_access_token().as_deref(), Some("A1"));
}

#[tokio::test]
async fn test_wrong_password_leaves_session_empty() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());

    let err = t
        .client
        .sign_in(&jewelbox_client::api::SignInRequest {
            email: helpers::EMAIL.to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ApiError::Status { status: 401, ref message } if message == "Invalid email or password"
    ));
    assert!(!t.client.tokens().is_authenticated());
    assert!(t.stored_access_token().is_none());
}

#[tokio::test]
async fn test_request_without_session_fails_without_network() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());

    let err = t.client.catalog().categories().await.unwrap_err();

    assert!(matches!(err, ApiError::Session(SessionError::NoRefreshToken)));
    assert!(err.forces_sign_out());
    assert_eq!(server.backend.protected_calls(), 0);
    assert_eq!(server.backend.refresh_calls(), 0);
}

#[tokio::test]
async fn test_fresh_token_is_sent_as_is() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    t.advance(600);

    let categories = t.client.catalog().categories().await.unwrap();

    assert_eq!(categories.len(), 3);
    assert_eq!(server.backend.bearers(), vec!["A1"]);
    assert_eq!(server.backend.refresh_calls(), 0);
}

#[tokio::test]
async fn test_expired_token_refreshed_before_request() {
    // Sign in with {A1, R1, 900s}; 901s later the request must carry A2.
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    t.advance(901);

    t.client.catalog().categories().await.unwrap();

    assert_eq!(server.backend.refresh_calls(), 1);
    assert_eq!(server.backend.protected_calls(), 1);
    assert_eq!(server.backend.bearers(), vec!["A2"]);
    assert_eq!(t.stored_access_token().as_deref(), Some("A2"));
    assert_eq!(
        t.store.snapshot().map(|p| p.refresh_token).as_deref(),
        Some("R2")
    );
}

#[tokio::test]
async fn test_token_inside_margin_refreshed_before_request() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    t.advance(880);

    t.client.catalog().products(None).await.unwrap();

    assert_eq!(server.backend.refresh_calls(), 1);
    assert_eq!(server.backend.bearers(), vec!["A2"]);
}

#[tokio::test]
async fn test_revoked_token_refreshed_and_retried_once() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    server.backend.revoke_access_tokens();

    let product = t.client.catalog().product("p-2").await.unwrap();

    assert_eq!(product.name, "Pearl Necklace");
    assert_eq!(server.backend.refresh_calls(), 1);
    assert_eq!(server.backend.bearers(), vec!["A1", "A2"]);
    assert_eq!(t.stored_access_token().as_deref(), Some("A2"));
}

#[tokio::test]
async fn test_second_rejection_is_final_and_keeps_session() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    server.backend.reject_all_protected();

    let err = t.client.orders().search(&Default::default()).await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Session(SessionError::AuthenticationFinal)
    ));
    assert_eq!(server.backend.refresh_calls(), 1);
    assert_eq!(server.backend.protected_calls(), 2);
    assert_eq!(server.backend.bearers(), vec!["A1", "A2"]);
    // The refreshed pair stays; only this request failed.
    assert!(t.client.tokens().is_authenticated());
    assert_eq!(t.stored_access_token().as_deref(), Some("A2"));
}

#[tokio::test]
async fn test_credential_endpoints_never_send_bearer() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    t.advance(901);
    t.client.catalog().categories().await.unwrap();
    t.sign_in().await;

    let headers = server.backend.credential_auth_headers();
    assert_eq!(headers.len(), 3);
    assert!(headers.iter().all(Option::is_none));
}

#[tokio::test]
async fn test_refresh_server_error_keeps_tokens() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    t.advance(901);
    server.backend.set_refresh_mode(RefreshMode::Fail(503));

    let err = t.client.catalog().categories().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Session(SessionError::NetworkFailure(_))
    ));
    assert!(err.is_retryable());
    assert_eq!(server.backend.protected_calls(), 0);
    assert_eq!(t.stored_access_token().as_deref(), Some("A1"));
    assert_eq!(
        t.client.tokens().current_access_token().as_deref(),
        Some("A1")
    );
}

#[tokio::test]
async fn test_refresh_forbidden_clears_session() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    t.advance(901);
    server.backend.set_refresh_mode(RefreshMode::Fail(403));

    let err = t.client.catalog().categories().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Session(SessionError::RefreshRejected { status: 403 })
    ));
    assert!(err.forces_sign_out());
    assert!(!t.client.tokens().is_authenticated());
    assert!(t.stored_access_token().is_none());

    // A later request does not retry with the cleared session.
    let err = t.client.catalog().categories().await.unwrap_err();
    assert!(matches!(err, ApiError::Session(SessionError::NoRefreshToken)));
    assert_eq!(server.backend.refresh_calls(), 1);
}

#[tokio::test]
async fn test_refresh_timeout_is_network_failure() {
    let server = MockBackend::start().await;
    let t = TestClient::with_store(&server.base_url(), MemoryTokenStore::new(), 1);
    t.sign_in().await;
    t.advance(901);
    server
        .backend
        .set_refresh_mode(RefreshMode::Slow(Duration::from_secs(3)));

    let err = t.client.catalog().categories().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Session(SessionError::NetworkFailure(_))
    ));
    assert_eq!(t.stored_access_token().as_deref(), Some("A1"));
}

#[tokio::test]
async fn test_unreachable_backend_keeps_restored_session() {
    // Reserve a port, then free it so nothing is listening.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let stale = TokenPair {
        access_token: "A9".to_string(),
        refresh_token: "R9".to_string(),
        access_token_expiry: helpers::t0() - chrono::Duration::seconds(60),
        user_id: helpers::USER_ID.to_string(),
    };
    let t = TestClient::with_store(
        &format!("http://{addr}/api"),
        MemoryTokenStore::with_pair(Some(stale.clone())),
        2,
    );
    assert_eq!(t.client.tokens().load_initial().await, Some(stale.clone()));

    let err = t.client.catalog().categories().await.unwrap_err();

    assert!(matches!(
        err,
        ApiError::Session(SessionError::NetworkFailure(_))
    ));
    assert_eq!(t.client.tokens().current_tokens(), Some(stale.clone()));
    assert_eq!(t.store.snapshot(), Some(stale));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_stale_requests_share_one_refresh() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    t.advance(901);
    server
        .backend
        .set_refresh_mode(RefreshMode::Slow(Duration::from_millis(200)));

    let catalog = t.client.catalog();
    let account = t.client.account();
    let (a, b, c, d) = tokio::join!(
        catalog.categories(),
        catalog.products(None),
        catalog.product("p-1"),
        account.me(),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok() && d.is_ok());
    assert_eq!(server.backend.refresh_calls(), 1);
    assert!(server.backend.bearers().iter().all(|b| b == "A2"));
    assert_eq!(t.stored_access_token().as_deref(), Some("A2"));
}

#[tokio::test]
async fn test_concurrent_rejections_share_one_refresh() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    server.backend.revoke_access_tokens();

    let catalog = t.client.catalog();
    let (a, b, c) = tokio::join!(
        catalog.categories(),
        catalog.product("p-3"),
        catalog.products(Some("c-rings")),
    );

    assert!(a.is_ok() && b.is_ok() && c.is_ok());
    // One-time refresh tokens: a second refresh call would have been rejected.
    assert_eq!(server.backend.refresh_calls(), 1);
    assert!(t.client.tokens().is_authenticated());
}

#[tokio::test]
async fn test_sign_out_clears_memory_and_store() {
    let server = MockBackend::start().await;
    let t = TestClient::new(&server.base_url());
    t.sign_in().await;
    let mut subscription = t.client.tokens().subscribe();
    let initial = subscription.next().await.unwrap();
    assert_eq!(initial.map(|p| p.access_token).as_deref(), Some("A1"));

    assert!(t.client.sign_out().await.is_persisted());

    assert!(!t.client.tokens().is_authenticated());
    assert!(t.stored_access_token().is_none());
    assert_eq!(subscription.next().await, Some(None));
}

#[tokio::test]
async fn test_connect_with_unreadable_session_file_starts_signed_out() {
    let server = MockBackend::start().await;
    let dir = tempfile::tempdir().unwrap();
    let token_file = dir.path().join("session.json");
    tokio::fs::create_dir(&token_file).await.unwrap();

    let mut config = AppConfig::default();
    config.api.base_url = server.base_url();
    config.session.storage = StorageBackend::File;
    config.session.token_file = token_file.to_string_lossy().into_owned();

    let client = JewelboxClient::connect(&config).await.unwrap();

    assert!(!client.tokens().is_authenticated());
    let err = client.catalog().categories().await.unwrap_err();
    assert!(matches!(err, ApiError::Session(SessionError::NoRefreshToken)));
    assert_eq!(server.backend.protected_calls(), 0);
}
