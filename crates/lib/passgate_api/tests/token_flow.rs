//! Integration tests — build the router over a seeded in-memory store and
//! drive the token and role endpoints end to end.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use passgate_api::{AppState, config::ApiConfig};
use passgate_core::{seed, store::CredentialStore};

const SIGNING_SECRET: &str = "integration-test-secret";

fn test_app() -> Router {
    let store = Arc::new(CredentialStore::new());
    seed::seed(&store).expect("seed store");

    passgate_api::router(AppState {
        store,
        config: ApiConfig {
            bind_addr: "127.0.0.1:0".into(),
            signing_secret: SIGNING_SECRET.into(),
        },
    })
}

async fn send_json(app: &Router, method: Method, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    read_response(app.clone().oneshot(req).await.expect("request")).await
}

async fn send_authed(
    app: &Router,
    method: Method,
    uri: &str,
    token: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"));
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let req = builder.body(body).unwrap();
    read_response(app.clone().oneshot(req).await.expect("request")).await
}

async fn read_response(resp: axum::response::Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse JSON")
    };
    (status, json)
}

async fn user_token(app: &Router, user_name: &str) -> Value {
    let (status, body) = send_json(
        app,
        Method::POST,
        "/api/token/get-token",
        json!({ "userName": user_name, "password": seed::SEED_PASSWORD }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    body
}

#[tokio::test]
async fn client_credentials_issue_a_token() {
    let app = test_app();
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/auth",
        json!({
            "clientId": seed::DEMO_CLIENT_ID,
            "clientSecret": seed::DEMO_CLIENT_SECRET,
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["access_token"].is_string());
    assert!(body["expires_at"].is_string());
    assert!(body.get("refresh_token").is_none());
}

#[tokio::test]
async fn wrong_client_secret_gets_problem_details() {
    let app = test_app();
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/auth",
        json!({ "clientId": seed::DEMO_CLIENT_ID, "clientSecret": "nope" }),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["title"], "Authentication Failed");
    assert_eq!(body["status"], 401);
    assert!(body["traceId"].is_string());
}

#[tokio::test]
async fn unknown_user_and_wrong_password_read_identically() {
    let app = test_app();
    let (s1, b1) = send_json(
        &app,
        Method::POST,
        "/api/token/get-token",
        json!({ "userName": "nobody", "password": "whatever" }),
    )
    .await;
    let (s2, b2) = send_json(
        &app,
        Method::POST,
        "/api/token/get-token",
        json!({ "userName": seed::ADMIN_USER_NAME, "password": "wrong" }),
    )
    .await;

    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(b1["detail"], b2["detail"]);
}

#[tokio::test]
async fn protected_route_requires_a_bearer_token() {
    let app = test_app();

    let req = Request::builder()
        .uri("/api/roles")
        .body(Body::empty())
        .unwrap();
    let (status, body) = read_response(app.clone().oneshot(req).await.unwrap()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["title"], "Authentication Failed");

    let (status, _) =
        send_authed(&app, Method::GET, "/api/roles", "not-a-real-token", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_can_list_roles() {
    let app = test_app();
    let grant = user_token(&app, seed::ADMIN_USER_NAME).await;
    let token = grant["access_token"].as_str().unwrap();

    let (status, body) = send_authed(&app, Method::GET, "/api/roles", token, None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Admin", "Basic"]);
}

#[tokio::test]
async fn basic_user_is_forbidden_not_unauthorized() {
    let app = test_app();
    let grant = user_token(&app, seed::BASIC_USER_NAME).await;
    let token = grant["access_token"].as_str().unwrap();

    let (status, body) = send_authed(&app, Method::GET, "/api/roles", token, None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["title"], "Permission Denied");
}

#[tokio::test]
async fn role_permissions_can_be_read_and_replaced() {
    let app = test_app();
    let grant = user_token(&app, seed::ADMIN_USER_NAME).await;
    let token = grant["access_token"].as_str().unwrap();

    let (status, body) = send_authed(
        &app,
        Method::GET,
        "/api/roles/Basic/permissions",
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permissions"], json!(["Permissions.Employees.Read"]));

    let (status, body) = send_authed(
        &app,
        Method::PUT,
        "/api/roles/Basic/permissions",
        token,
        Some(json!({
            "permissions": ["Permissions.Employees.Read", "Permissions.Roles.Read"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "update failed: {body}");
    assert_eq!(
        body["permissions"],
        json!(["Permissions.Employees.Read", "Permissions.Roles.Read"])
    );
}

#[tokio::test]
async fn repeated_permission_in_update_is_stored_once() {
    let app = test_app();
    let grant = user_token(&app, seed::ADMIN_USER_NAME).await;
    let token = grant["access_token"].as_str().unwrap();

    let (status, _) = send_authed(
        &app,
        Method::PUT,
        "/api/roles/Basic/permissions",
        token,
        Some(json!({
            "permissions": ["Permissions.Employees.Read", "Permissions.Employees.Read"]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send_authed(
        &app,
        Method::GET,
        "/api/roles/Basic/permissions",
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["permissions"], json!(["Permissions.Employees.Read"]));
}

#[tokio::test]
async fn unknown_permission_name_rejects_the_update() {
    let app = test_app();
    let grant = user_token(&app, seed::ADMIN_USER_NAME).await;
    let token = grant["access_token"].as_str().unwrap();

    let (status, body) = send_authed(
        &app,
        Method::PUT,
        "/api/roles/Basic/permissions",
        token,
        Some(json!({ "permissions": ["Permissions.Nope.Read"] })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Validation Failed");
}

#[tokio::test]
async fn missing_role_is_not_found() {
    let app = test_app();
    let grant = user_token(&app, seed::ADMIN_USER_NAME).await;
    let token = grant["access_token"].as_str().unwrap();

    let (status, _) = send_authed(
        &app,
        Method::GET,
        "/api/roles/Ghost/permissions",
        token,
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn refresh_rotates_and_rejects_reuse() {
    let app = test_app();
    let grant = user_token(&app, seed::ADMIN_USER_NAME).await;
    let access = grant["access_token"].as_str().unwrap();
    let refresh = grant["refresh_token"].as_str().unwrap();

    let (status, renewed) = send_json(
        &app,
        Method::POST,
        "/api/token/refresh-token",
        json!({ "token": access, "refreshToken": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "refresh failed: {renewed}");
    assert!(renewed["refresh_token"].is_string());
    assert_ne!(renewed["refresh_token"], grant["refresh_token"]);

    // Single use: replaying the consumed refresh token is a 400.
    let (status, body) = send_json(
        &app,
        Method::POST,
        "/api/token/refresh-token",
        json!({ "token": access, "refreshToken": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["title"], "Validation Failed");
}

#[tokio::test]
async fn refresh_with_foreign_access_token_is_a_bad_request() {
    let app = test_app();
    let grant = user_token(&app, seed::ADMIN_USER_NAME).await;
    let refresh = grant["refresh_token"].as_str().unwrap();

    let (status, _) = send_json(
        &app,
        Method::POST,
        "/api/token/refresh-token",
        json!({ "token": "garbage", "refreshToken": refresh }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
