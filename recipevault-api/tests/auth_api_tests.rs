/// Integration tests for authentication endpoints
///
/// Covers registration, login, token refresh, the profile endpoints,
/// and the failure paths for each.

mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::{body_json, TestContext, TEST_PASSWORD};
use serde_json::json;
use tower::Service as _;
use uuid::Uuid;

/// Sends an unauthenticated JSON request
async fn public_request(
    ctx: &TestContext,
    method: &str,
    uri: &str,
    body: serde_json::Value,
) -> axum::response::Response {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();

    ctx.app.clone().call(request).await.unwrap()
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_register_returns_tokens() {
    let ctx = TestContext::new().await.unwrap();

    let email = format!("register-{}@example.com", Uuid::new_v4());
    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/register",
        json!({
            "email": email,
            "password": TEST_PASSWORD,
            "name": "New User"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);

    let body = body_json(response).await;
    assert!(body["user_id"].is_string());
    assert!(body["access_token"].is_string());
    assert!(body["refresh_token"].is_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_register_duplicate_email_conflicts() {
    let ctx = TestContext::new().await.unwrap();

    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/register",
        json!({
            "email": ctx.user.email,
            "password": TEST_PASSWORD
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CONFLICT);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_register_weak_password_rejected() {
    let ctx = TestContext::new().await.unwrap();

    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/register",
        json!({
            "email": format!("weak-{}@example.com", Uuid::new_v4()),
            "password": "alllowercase"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "validation_error");

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_login_and_refresh_roundtrip() {
    let ctx = TestContext::new().await.unwrap();

    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/login",
        json!({
            "email": ctx.user.email,
            "password": TEST_PASSWORD
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let refresh_token = body["refresh_token"].as_str().unwrap().to_string();

    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(body["access_token"].is_string());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_login_wrong_password_unauthorized() {
    let ctx = TestContext::new().await.unwrap();

    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/login",
        json!({
            "email": ctx.user.email,
            "password": "WrongPass123"
        }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_refresh_rejects_access_token() {
    let ctx = TestContext::new().await.unwrap();

    // The bearer token is an access token; refresh must reject it
    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/refresh",
        json!({ "refresh_token": ctx.jwt_token }),
    )
    .await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_me_returns_profile_without_hash() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx.request("GET", "/v1/users/me", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["email"], ctx.user.email);
    assert_eq!(body["name"], "Test User");
    assert!(body.get("password_hash").is_none());

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_me_requires_auth() {
    let ctx = TestContext::new().await.unwrap();

    let request = Request::builder()
        .method("GET")
        .uri("/v1/users/me")
        .body(Body::empty())
        .unwrap();
    let response = ctx.app.clone().call(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_update_me_changes_password() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .request(
            "PATCH",
            "/v1/users/me",
            Some(json!({ "password": "NewSecret456" })),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    // Old password no longer works, new one does
    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/login",
        json!({ "email": ctx.user.email, "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = public_request(
        &ctx,
        "POST",
        "/v1/auth/login",
        json!({ "email": ctx.user.email, "password": "NewSecret456" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    ctx.cleanup().await.unwrap();
}

#[tokio::test]
#[ignore = "requires a running PostgreSQL instance"]
async fn test_update_me_clears_name_with_null() {
    let ctx = TestContext::new().await.unwrap();

    let response = ctx
        .request("PATCH", "/v1/users/me", Some(json!({ "name": null })))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert!(body["name"].is_null());

    // Absent name leaves the (cleared) value untouched
    let response = ctx
        .request("PATCH", "/v1/users/me", Some(json!({})))
        .await;
    let body = body_json(response).await;
    assert!(body["name"].is_null());

    ctx.cleanup().await.unwrap();
}
