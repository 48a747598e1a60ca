//! HTTP API tests against the real router

mod common;

use axum::{
    body::Body,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        Method, Request, StatusCode,
    },
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{test_state, ADMIN_PASS, ADMIN_USER};
use lendpool_server::api;

async fn app() -> Router {
    api::router(test_state().await)
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": username, "password": password })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().expect("No token in response").to_string()
}

async fn register(app: &Router, username: &str) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({
            "username": username,
            "displayName": "Staff Member",
            "password": "staff-pass"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["principal"]["role"], "staff");
    assert_eq!(body["principal"]["displayName"], "Staff Member");
    body["token"].as_str().expect("No token in response").to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = send(&app, Method::GET, "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "username": ADMIN_USER, "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "invalid_credentials");
    assert!(body["error"]["message"].is_string());
}

#[tokio::test]
async fn test_unauthorized_access() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/equipments", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "unauthenticated");

    let (status, body) = send(&app, Method::GET, "/equipments", Some("garbage"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "unauthenticated");
}

#[tokio::test]
async fn test_credential_checked_before_input() {
    let app = app().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/equipments")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{bad"))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let (status, body) = send(&app, Method::DELETE, "/equipments/abc", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "unauthenticated");

    let (status, body) = send(
        &app,
        Method::POST,
        "/equipments/abc/borrow",
        Some("garbage"),
        Some(json!({ "borrowerName": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["kind"], "unauthenticated");

    // With a valid credential the same malformed input is a validation error
    let admin = login(&app, ADMIN_USER, ADMIN_PASS).await;
    let (status, body) = send(&app, Method::DELETE, "/equipments/abc", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");
    assert_eq!(body["error"]["field"], "id");
}

#[tokio::test]
async fn test_me_returns_principal() {
    let app = app().await;
    let token = login(&app, ADMIN_USER, ADMIN_PASS).await;

    let (status, body) = send(&app, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], ADMIN_USER);
    assert_eq!(body["role"], "admin");
    assert_eq!(body["displayName"], "Lab Admin");
}

#[tokio::test]
async fn test_staff_cannot_create() {
    let app = app().await;
    let token = register(&app, "staffer").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/equipments",
        Some(&token),
        Some(json!({ "itemName": "Laptop", "category": "Computer", "qty": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["kind"], "forbidden");

    let (_, body) = send(&app, Method::GET, "/equipments", Some(&token), None).await;
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_equipment_lifecycle() {
    let app = app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASS).await;
    let staff = register(&app, "borrower").await;

    let (status, created) = send(
        &app,
        Method::POST,
        "/equipments",
        Some(&admin),
        Some(json!({ "itemName": "Laptop", "category": "Computer", "qty": "2" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "available");
    assert_eq!(created["qty"], 2);
    assert_eq!(created["borrowerName"], "");
    assert!(created["borrowedAt"].is_null());
    let id = created["id"].as_i64().expect("No equipment ID");

    let (status, borrowed) = send(
        &app,
        Method::POST,
        &format!("/equipments/{}/borrow", id),
        Some(&staff),
        Some(json!({ "borrowerName": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(borrowed["status"], "borrowed");
    assert_eq!(borrowed["borrowerName"], "Alice");
    assert!(borrowed["borrowedAt"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/equipments/{}/borrow", id),
        Some(&staff),
        Some(json!({ "borrowerName": "Bob" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "already_borrowed");

    let (_, listed) = send(&app, Method::GET, "/equipments", Some(&staff), None).await;
    assert_eq!(listed[0]["status"], "borrowed");
    assert_eq!(listed[0]["borrowerName"], "Alice");

    let (status, returned) = send(
        &app,
        Method::POST,
        &format!("/equipments/{}/return", id),
        Some(&staff),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(returned["status"], "available");
    assert_eq!(returned["borrowerName"], "");

    let (status, body) = send(
        &app,
        Method::POST,
        &format!("/equipments/{}/return", id),
        Some(&staff),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "not_borrowed");

    let (status, updated) = send(
        &app,
        Method::PUT,
        &format!("/equipments/{}", id),
        Some(&admin),
        Some(json!({ "itemName": "Laptop 14\"", "category": "Electronics", "qty": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["category"], "Electronics");
    assert_eq!(updated["qty"], 3);

    let (status, body) = send(
        &app,
        Method::DELETE,
        &format!("/equipments/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));

    let (status, body) = send(
        &app,
        Method::GET,
        &format!("/equipments/{}", id),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["kind"], "not_found");
}

#[tokio::test]
async fn test_validation_envelope() {
    let app = app().await;
    let admin = login(&app, ADMIN_USER, ADMIN_PASS).await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/equipments",
        Some(&admin),
        Some(json!({ "itemName": "A", "category": "Computer", "qty": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");
    assert_eq!(body["error"]["field"], "itemName");

    let (status, body) = send(
        &app,
        Method::POST,
        "/equipments",
        Some(&admin),
        Some(json!({ "itemName": "Mouse", "category": "Computer", "qty": 0 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["field"], "qty");

    let (status, body) = send(
        &app,
        Method::POST,
        "/equipments",
        Some(&admin),
        Some(json!("not an object")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");

    let (status, body) = send(&app, Method::GET, "/equipments/abc", Some(&admin), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["kind"], "validation");
}

#[tokio::test]
async fn test_duplicate_registration() {
    let app = app().await;
    register(&app, "twice").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "username": "TWICE", "displayName": "Again", "password": "another" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["kind"], "conflict");
}

#[tokio::test]
async fn test_openapi_document() {
    let app = app().await;

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/equipments/{id}/borrow"].is_object());
}
