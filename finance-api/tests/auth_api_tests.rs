mod common;

use auth::Claims;
use auth::TokenKind;
use chrono::Duration;
use chrono::Utc;
use common::TestApp;
use finance_api::domain::user::models::UserStatus;
use reqwest::StatusCode;
use serde_json::json;
use serde_json::Value;

#[tokio::test]
async fn test_register_login_me_refresh_flow() {
    let app = TestApp::spawn().await;

    let registered = app.register_alice().await;
    assert_eq!(registered["tokenType"], "Bearer");
    assert_eq!(registered["expiresIn"], 900);
    assert_eq!(registered["user"]["username"], "alice");
    assert_eq!(registered["user"]["email"], "alice@x.com");
    assert_eq!(registered["user"]["status"], "ACTIVE");
    assert!(registered["user"]["id"].is_string());

    let access_token = registered["accessToken"].as_str().unwrap();
    let refresh_token = registered["refreshToken"].as_str().unwrap();

    let response = app
        .get_authenticated("/auth/me", access_token)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let me: Value = response.json().await.unwrap();
    assert_eq!(me["username"], "alice");
    assert_eq!(me["status"], "ACTIVE");
    assert!(me["createdAt"].is_string());

    let response = app
        .post("/auth/refresh")
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), StatusCode::OK);
    let refreshed: Value = response.json().await.unwrap();
    assert_ne!(refreshed["accessToken"], registered["accessToken"]);
    assert_eq!(refreshed["user"]["username"], "alice");

    // Old refresh tokens stay usable until they expire
    let response = app
        .post("/auth/refresh")
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_login_by_username_and_by_email() {
    let app = TestApp::spawn().await;
    app.register_alice().await;

    for identifier in ["alice", "alice@x.com"] {
        let response = app.login(identifier, "Passw0rd!").await;
        assert_eq!(response.status(), StatusCode::OK, "login as {}", identifier);

        let body: Value = response.json().await.unwrap();
        assert!(body["accessToken"].is_string());
        assert!(body["refreshToken"].is_string());
        assert_eq!(body["user"]["username"], "alice");
    }
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::spawn().await;
    app.register_alice().await;

    let wrong_password = app.login("alice", "Wr0ngPass!").await;
    let unknown_user = app.login("nobody", "Passw0rd!").await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);

    let wrong_password: Value = wrong_password.json().await.unwrap();
    let unknown_user: Value = unknown_user.json().await.unwrap();
    assert_eq!(wrong_password["message"], "Invalid username or password");
    assert_eq!(wrong_password["message"], unknown_user["message"]);
    assert_eq!(wrong_password["code"], "AUTHENTICATION_ERROR");
    assert_eq!(wrong_password["path"], "/auth/login");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::spawn().await;
    app.register_alice().await;

    let response = app.register("alice", "other@x.com", "Passw0rd!").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "CONFLICT");
    assert_eq!(body["message"], "Username is already taken");
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let app = TestApp::spawn().await;
    app.register_alice().await;

    let response = app.register("bob", "alice@x.com", "Passw0rd!").await;

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Email is already registered");
}

#[tokio::test]
async fn test_register_weak_password() {
    let app = TestApp::spawn().await;

    let response = app.register("alice", "alice@x.com", "password").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["status"], 400);
    assert_eq!(body["error"], "Bad Request");

    // Nothing was stored, so the name is still free
    let response = app.register("alice", "alice@x.com", "Passw0rd!").await;
    assert_eq!(response.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn test_register_pending_when_email_verification_required() {
    let app = TestApp::spawn_with_email_verification(true).await;

    let response = app.register("alice", "alice@x.com", "Passw0rd!").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["user"]["status"], "PENDING");
    assert!(body.get("accessToken").is_none());

    let response = app.login("alice", "Passw0rd!").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_inactive_user_cannot_login_refresh_or_call_me() {
    let app = TestApp::spawn().await;
    let registered = app.register_alice().await;
    let user_id = registered["user"]["id"].as_str().unwrap();
    let access_token = registered["accessToken"].as_str().unwrap();
    let refresh_token = registered["refreshToken"].as_str().unwrap();

    app.set_status(user_id, UserStatus::Inactive).await;

    let response = app.login("alice", "Passw0rd!").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Account is not active");

    let response = app
        .post("/auth/refresh")
        .json(&json!({ "refreshToken": refresh_token }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .get_authenticated("/auth/me", access_token)
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reactivation restores access with the same credentials
    app.set_status(user_id, UserStatus::Active).await;
    let response = app.login("alice", "Passw0rd!").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_refresh_with_access_token_is_rejected() {
    let app = TestApp::spawn().await;
    let registered = app.register_alice().await;

    let response = app
        .post("/auth/refresh")
        .json(&json!({ "refreshToken": registered["accessToken"] }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(body["message"], "Invalid refresh token");
}

#[tokio::test]
async fn test_refresh_with_expired_token() {
    let app = TestApp::spawn().await;
    let registered = app.register_alice().await;
    let user_id = registered["user"]["id"].as_str().unwrap();

    let now = Utc::now().timestamp();
    let claims = Claims::new(user_id, TokenKind::Refresh, Duration::days(7))
        .with_issued_at(now - 7200)
        .with_expiration(now - 60);
    let expired = app.authenticator.token_codec().encode(&claims).unwrap();

    let response = app
        .post("/auth/refresh")
        .json(&json!({ "refreshToken": expired }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "AUTHENTICATION_ERROR");
}

#[tokio::test]
async fn test_refresh_with_blank_token() {
    let app = TestApp::spawn().await;

    let response = app
        .post("/auth/refresh")
        .json(&json!({ "refreshToken": "  " }))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: Value = response.json().await.unwrap();
    assert!(body["details"]["refreshToken"].is_string());
}

#[tokio::test]
async fn test_me_without_token() {
    let app = TestApp::spawn().await;

    let response = app.get("/auth/me").send().await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "AUTHENTICATION_ERROR");
    assert_eq!(body["path"], "/auth/me");
    assert!(body["timestamp"].is_string());
}

#[tokio::test]
async fn test_me_with_token_signed_by_other_secret() {
    let app = TestApp::spawn().await;
    let registered = app.register_alice().await;
    let user_id = registered["user"]["id"].as_str().unwrap();

    let foreign = auth::TokenCodec::new(b"another-secret-key-that-is-32-bytes-long!")
        .unwrap()
        .issue(user_id, TokenKind::Access, Duration::minutes(15))
        .unwrap();

    let response = app
        .get_authenticated("/auth/me", &foreign)
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::spawn().await;

    let response = app.get("/auth/health").send().await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.text().await.unwrap(), "Auth service is running");
}
