use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::Duration;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes::build_auth_router;
use server::state::AuthState;
use service::auth::repository::{mock::MockAuthRepository, AuthRepository};
use service::auth::{AuthService, TokenManager};

fn build_app() -> Router {
    let repo: Arc<dyn AuthRepository> = Arc::new(MockAuthRepository::default());
    let tokens = TokenManager::new("test-secret", Duration::minutes(15), Duration::hours(168));
    build_auth_router(AuthState { auth: Arc::new(AuthService::new(repo, tokens)) })
}

async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>, bearer: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(t) = bearer {
        builder = builder.header("authorization", format!("Bearer {t}"));
    }
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn register_and_login(app: &Router, email: &str) -> Value {
    let (status, _) = call(app, "POST", "/api/v1/auth/register",
        Some(json!({"email": email, "password": "secret1", "name": "Tester"})), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = call(app, "POST", "/api/v1/auth/login",
        Some(json!({"email": email, "password": "secret1"})), None).await;
    assert_eq!(status, StatusCode::OK);
    body
}

#[tokio::test]
async fn register_returns_user_without_password_hash() {
    let app = build_app();
    let (status, body) = call(&app, "POST", "/api/v1/auth/register",
        Some(json!({"email": "New@Example.com", "password": "secret1", "name": "New"})), None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "new@example.com");
    assert_eq!(body["user"]["role"], "user");
    assert_eq!(body["user"]["email_verified"], false);
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn duplicate_and_invalid_registrations_are_bad_requests() {
    let app = build_app();
    let payload = json!({"email": "dup@example.com", "password": "secret1", "name": "Dup"});
    assert_eq!(call(&app, "POST", "/api/v1/auth/register", Some(payload.clone()), None).await.0, StatusCode::CREATED);

    let (status, body) = call(&app, "POST", "/api/v1/auth/register", Some(payload), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "user already exists");

    let (status, _) = call(&app, "POST", "/api/v1/auth/register",
        Some(json!({"email": "short@example.com", "password": "123", "name": "S"})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&app, "POST", "/api/v1/auth/register", Some(json!({"email": 1})), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn login_returns_bearer_pair_and_rejects_bad_password() {
    let app = build_app();
    let session = register_and_login(&app, "login@example.com").await;
    assert_eq!(session["token_type"], "Bearer");
    assert_eq!(session["expires_in"], 900);
    assert!(session["access_token"].is_string());
    assert!(session["refresh_token"].is_string());
    assert_eq!(session["user"]["email"], "login@example.com");

    let (status, body) = call(&app, "POST", "/api/v1/auth/login",
        Some(json!({"email": "login@example.com", "password": "wrong-one"})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "invalid email or password");
}

#[tokio::test]
async fn verify_accepts_header_or_body() {
    let app = build_app();
    let session = register_and_login(&app, "verify@example.com").await;
    let access = session["access_token"].as_str().unwrap();

    let (status, body) = call(&app, "POST", "/api/v1/auth/verify", None, Some(access)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
    assert_eq!(body["user_id"], session["user"]["id"]);
    assert_eq!(body["role"], "user");
    assert!(body["expires_at"].is_string());

    let (status, body) = call(&app, "POST", "/api/v1/auth/verify", Some(json!({"token": access})), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn verify_rejects_missing_malformed_and_refresh_tokens() {
    let app = build_app();
    let session = register_and_login(&app, "reject@example.com").await;

    assert_eq!(call(&app, "POST", "/api/v1/auth/verify", None, None).await.0, StatusCode::UNAUTHORIZED);
    assert_eq!(call(&app, "POST", "/api/v1/auth/verify", None, Some("garbage")).await.0, StatusCode::UNAUTHORIZED);
    let refresh = session["refresh_token"].as_str().unwrap();
    assert_eq!(call(&app, "POST", "/api/v1/auth/verify", None, Some(refresh)).await.0, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn refresh_issues_new_access_token() {
    let app = build_app();
    let session = register_and_login(&app, "refresh@example.com").await;

    let (status, body) = call(&app, "POST", "/api/v1/auth/refresh",
        Some(json!({"refresh_token": session["refresh_token"]})), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token_type"], "Bearer");
    let access = body["access_token"].as_str().unwrap();
    assert_eq!(call(&app, "POST", "/api/v1/auth/verify", None, Some(access)).await.0, StatusCode::OK);

    let (status, _) = call(&app, "POST", "/api/v1/auth/refresh",
        Some(json!({"refresh_token": session["access_token"]})), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_health_metrics_and_docs() {
    let app = build_app();
    let (status, body) = call(&app, "POST", "/api/v1/auth/logout", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logged out successfully");

    let (status, body) = call(&app, "GET", "/healthz", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    let (status, body) = call(&app, "GET", "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/v1/auth/login"].is_object());

    let resp = app
        .clone()
        .oneshot(Request::builder().uri("/metrics").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let text = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    assert!(String::from_utf8_lossy(&text).contains("portfolio_http_requests_total"));
}
