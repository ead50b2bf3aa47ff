//! Mock-server tests for the session core.
//!
//! These tests use wiremock to simulate the application server and exercise
//! the session state machine without network access or real credentials.

use std::sync::Arc;

use chrono::{Duration, Utc};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vestibule::{
    Credentials, ErrorKind, MemoryStorage, Presentation, ServerUrl, SessionManager, SessionState,
    classify,
};

fn mock_server_url(server: &MockServer) -> ServerUrl {
    ServerUrl::new(format!("http://127.0.0.1:{}", server.address().port())).unwrap()
}

fn manager_for(server: &MockServer, storage: Arc<MemoryStorage>) -> SessionManager {
    SessionManager::new(mock_server_url(server), storage)
}

fn identity_json() -> serde_json::Value {
    json!({
        "id": "u-1",
        "email": "alice@example.com",
        "isActive": true,
        "isSuperAdmin": false,
        "createdAt": "2024-01-01T00:00:00Z",
        "updatedAt": "2024-06-01T00:00:00Z",
        "details": { "firstName": "Alice", "lastName": "Ayers" },
        "resources": [
            { "resourceId": "org-1", "resourceName": "Org One", "role": "manager" }
        ]
    })
}

async fn mount_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1"
        })))
        .mount(server)
        .await;
}

async fn mount_me(server: &MockServer, token: &str) {
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json()))
        .mount(server)
        .await;
}

fn credentials() -> Credentials {
    Credentials::new("alice@example.com", "secret123")
}

// ============================================================================
// Login
// ============================================================================

#[tokio::test]
async fn login_resolves_identity_and_permissions() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    Mock::given(method("GET"))
        .and(path("/auth/permissions"))
        .and(header("authorization", "Bearer access-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceId": "org-1",
            "roleId": "role-1",
            "role": "manager",
            "permissions": ["tasks.read", "tasks.write"]
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    let state = manager.state();
    assert!(matches!(state, SessionState::Authenticated(_)));
    assert_eq!(manager.identity().unwrap().email, "alice@example.com");
    assert!(!manager.is_loading());

    assert!(manager.has_permission("tasks.read"));
    assert!(!manager.has_permission("tasks.delete"));
}

#[tokio::test]
async fn login_is_a_no_op_when_already_authenticated() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-1",
            "refreshToken": "refresh-1"
        })))
        .expect(1)
        .mount(&server)
        .await;
    mount_me(&server, "access-1").await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();
    // Second call must not hit the credential endpoint again
    manager.login(&credentials()).await.unwrap();

    assert!(manager.state().is_authenticated());
}

#[tokio::test]
async fn login_failure_is_rethrown_and_classified_at_the_boundary() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid credentials"
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    let err = manager.login(&credentials()).await.unwrap_err();

    let classified = classify(&err);
    assert_eq!(classified.kind, ErrorKind::Credentials);
    assert_eq!(classified.presentation, Presentation::Blocking);
    assert!(!manager.state().is_authenticated());
}

#[tokio::test]
async fn unverified_login_becomes_an_actionable_notification() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "User account is not active and unverified"
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    let err = manager.login(&credentials()).await.unwrap_err();

    let classified = classify(&err);
    assert_eq!(classified.kind, ErrorKind::Unverified);
    assert_eq!(classified.presentation, Presentation::Notification);
    assert!(classified.action.is_some());
}

#[tokio::test]
async fn failed_identity_fetch_during_login_leaves_no_credentials() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let manager = manager_for(&server, storage.clone());
    let err = manager.login(&credentials()).await.unwrap_err();
    assert!(classify(&err).kind == ErrorKind::Generic);
    assert!(!manager.state().is_authenticated());

    // The pair issued by the credential endpoint must not survive the
    // failed sign-in: a restarted manager stays signed out.
    let restarted = manager_for(&server, storage);
    restarted.initialize().await;
    assert_eq!(restarted.state(), SessionState::Unauthenticated);
}

#[tokio::test]
async fn wildcard_permission_grants_every_query() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    Mock::given(method("GET"))
        .and(path("/auth/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "resourceId": "org-1",
            "roleId": "role-0",
            "role": "owner",
            "permissions": ["*"]
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    assert!(manager.has_permission("tasks.read"));
    assert!(manager.has_permission("anything.else.entirely"));
}

#[tokio::test]
async fn permission_fetch_failure_fails_closed_without_blocking_login() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    Mock::given(method("GET"))
        .and(path("/auth/permissions"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    assert!(manager.state().is_authenticated());
    assert!(manager.permissions().is_none());
    assert!(!manager.has_permission("tasks.read"));
}

// ============================================================================
// Degraded mode
// ============================================================================

#[tokio::test]
async fn oversized_credential_short_circuits_to_degraded_mode() {
    let server = MockServer::start().await;

    let huge_token = "x".repeat(9_000);
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": huge_token,
            "refreshToken": "refresh-1",
            "isSuperAdmin": true
        })))
        .mount(&server)
        .await;

    // The live identity endpoint must never be called
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json()))
        .expect(0)
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    match manager.state() {
        SessionState::DegradedAuthenticated(identity) => {
            assert_eq!(identity.email, "alice@example.com");
            assert!(identity.is_super_admin);
        }
        other => panic!("expected degraded authentication, got {:?}", other),
    }
}

// ============================================================================
// Initialize
// ============================================================================

#[tokio::test]
async fn initialize_without_credentials_resolves_unauthenticated() {
    let server = MockServer::start().await;
    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));

    manager.initialize().await;

    assert_eq!(manager.state(), SessionState::Unauthenticated);
    assert!(!manager.is_loading());
}

#[tokio::test]
async fn initialize_rehydrates_a_persisted_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    let storage = Arc::new(MemoryStorage::new());
    let first = manager_for(&server, storage.clone());
    first.login(&credentials()).await.unwrap();

    // A fresh manager over the same storage picks the session back up
    let restarted = manager_for(&server, storage);
    restarted.initialize().await;

    assert!(matches!(restarted.state(), SessionState::Authenticated(_)));
    assert_eq!(restarted.identity().unwrap().email, "alice@example.com");
}

#[tokio::test]
async fn concurrent_initialize_calls_collapse_into_one() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    // One call from login, exactly one more from the collapsed initialize
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json()))
        .expect(2)
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let first = manager_for(&server, storage.clone());
    first.login(&credentials()).await.unwrap();

    let restarted = manager_for(&server, storage);
    let a = restarted.clone();
    let b = restarted.clone();
    tokio::join!(a.initialize(), b.initialize());

    assert!(restarted.state().is_authenticated());
}

#[tokio::test]
async fn failed_recovery_during_initialize_clears_the_session() {
    let server = MockServer::start().await;
    mount_login(&server).await;

    // Identity fetch succeeds once (during login), then the credential goes bad
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(200).set_body_json(identity_json()))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/me"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid token"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid token"
        })))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let first = manager_for(&server, storage.clone());
    first.login(&credentials()).await.unwrap();

    let restarted = manager_for(&server, storage.clone());
    restarted.initialize().await;

    assert_eq!(restarted.state(), SessionState::Unauthenticated);
    assert!(restarted.identity().is_none());
    assert!(restarted.permissions().is_none());

    // Credentials and snapshot are gone: a further restart stays signed out
    // without touching the network.
    let later = manager_for(&server, storage);
    later.initialize().await;
    assert_eq!(later.state(), SessionState::Unauthenticated);
}

// ============================================================================
// Refresh
// ============================================================================

#[tokio::test]
async fn refresh_rotates_the_access_credential() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;
    mount_me(&server, "access-2").await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .and(body_json(json!({ "refreshToken": "refresh-1" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "accessToken": "access-2"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    manager.refresh().await;

    assert!(matches!(manager.state(), SessionState::Authenticated(_)));
}

#[tokio::test]
async fn refresh_failure_degrades_silently_to_unauthenticated() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "message": "Invalid token"
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    manager.refresh().await;

    assert_eq!(manager.state(), SessionState::Unauthenticated);
    assert!(manager.identity().is_none());
    assert!(manager.permissions().is_none());
}

// ============================================================================
// Logout
// ============================================================================

#[tokio::test]
async fn logout_clears_the_session_even_when_the_endpoint_fails() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let storage = Arc::new(MemoryStorage::new());
    let manager = manager_for(&server, storage.clone());
    manager.login(&credentials()).await.unwrap();

    manager.logout().await;

    assert_eq!(manager.state(), SessionState::Unauthenticated);
    assert!(manager.permissions().is_none());

    // Persisted state is gone too
    let restarted = manager_for(&server, storage);
    restarted.initialize().await;
    assert_eq!(restarted.state(), SessionState::Unauthenticated);
}

// ============================================================================
// Password rotation
// ============================================================================

#[tokio::test]
async fn stale_password_raises_a_rotation_prompt() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    let last_update = Utc::now() - Duration::days(120);
    Mock::given(method("GET"))
        .and(path("/auth/password-audit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "create_date": "2023-01-01T00:00:00Z",
            "last_update": last_update.to_rfc3339(),
            "updated_by": "alice@example.com",
            "how_many": 3
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    let prompt = manager.password_rotation().expect("rotation prompt expected");
    assert_eq!(prompt.role, "manager");
    assert!(prompt.last_update_days.unwrap() >= 120);

    manager.dismiss_password_rotation();
    assert!(manager.password_rotation().is_none());
}

#[tokio::test]
async fn recent_password_raises_no_prompt() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    let last_update = Utc::now() - Duration::days(5);
    Mock::given(method("GET"))
        .and(path("/auth/password-audit"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "create_date": "2023-01-01T00:00:00Z",
            "last_update": last_update.to_rfc3339(),
            "updated_by": "alice@example.com",
            "how_many": 1
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    assert!(manager.state().is_authenticated());
    assert!(manager.password_rotation().is_none());
}

#[tokio::test]
async fn audit_fetch_failure_never_blocks_sign_in() {
    let server = MockServer::start().await;
    mount_login(&server).await;
    mount_me(&server, "access-1").await;

    Mock::given(method("GET"))
        .and(path("/auth/password-audit"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    manager.login(&credentials()).await.unwrap();

    assert!(manager.state().is_authenticated());
    assert!(manager.password_rotation().is_none());
}

// ============================================================================
// Register
// ============================================================================

#[tokio::test]
async fn register_conflict_is_rethrown_for_classification() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(json!({
            "email": "alice@example.com",
            "password": "secret123"
        })))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "message": "User already exists"
        })))
        .mount(&server)
        .await;

    let manager = manager_for(&server, Arc::new(MemoryStorage::new()));
    let err = manager.register(&credentials()).await.unwrap_err();

    let classified = classify(&err);
    assert_eq!(classified.kind, ErrorKind::Generic);
    assert_eq!(classified.title, "Registration failed");
}
