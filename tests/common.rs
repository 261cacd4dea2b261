//! Shared helpers for the YakCat integration tests
//!
//! Each test builds its own application over a private in-memory SQLite
//! database and talks to it through the router, the same way a browser or
//! `yakcat-cli` would.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use yakcat::{
    auth::hash_password,
    config::{base_config, Config, ConfigUpdate},
    create_app,
    db::{init_pool, DbPool},
    models::Role,
    repo, run_migrations,
    state::AppState,
};

/// Password used by every account the helpers create
pub const PASSWORD: &str = "password123";

/// Dev-mode configuration with a fixed secret and the cheapest bcrypt cost
pub fn test_config() -> Config {
    base_config(None).apply_update(ConfigUpdate {
        jwt_secret: Some("integration-secret".to_string()),
        bcrypt_cost: Some(4),
        dev_mode: Some(true),
        ..Default::default()
    })
}

/// Opens `database_url` and brings its schema up to date
pub fn open_pool(database_url: &str) -> Arc<DbPool> {
    let pool = init_pool(database_url).unwrap();
    run_migrations(&mut pool.get().unwrap()).unwrap();
    Arc::new(pool)
}

/// Creates an application over a fresh in-memory database
///
/// ### Returns
///
/// The router and its pool, for arranging data the API cannot create
/// directly (staff and admin accounts)
pub fn create_test_app() -> (Router, Arc<DbPool>) {
    let url = format!("file:it_{}?mode=memory&cache=shared", uuid::Uuid::new_v4());
    let pool = open_pool(&url);
    (create_app(AppState::new(pool.clone(), &test_config())), pool)
}

/// Inserts an account with `PASSWORD`, bypassing registration
pub async fn create_account(pool: &DbPool, email: &str, role: Role) -> String {
    let hash = hash_password(PASSWORD, 4).await.unwrap();
    repo::create_user(pool, email, Some(email.to_string()), hash, role)
        .await
        .unwrap()
        .get_id()
}

/// Sends a request, with an optional bearer token and JSON body
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    app.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
}

/// Sends `raw` as a JSON-typed body without checking that it parses
pub async fn send_raw(app: &Router, method: Method, uri: &str, token: Option<&str>, raw: &str) -> Response {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    app.clone().oneshot(builder.body(Body::from(raw.to_string())).unwrap()).await.unwrap()
}

/// Reads a response body as JSON (`Value::Null` when empty)
pub async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}

/// Like [`send`], returning the status and the parsed body
pub async fn call(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let response = send(app, method, uri, token, body).await;
    let status = response.status();
    (status, body_json(response).await)
}

/// Logs in through the API and returns the session token
pub async fn login(app: &Router, email: &str) -> String {
    let (status, body) = call(
        app,
        Method::POST,
        "/api/auth/login",
        None,
        Some(serde_json::json!({"email": email, "password": PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed for {}: {}", email, body);
    body["token"].as_str().unwrap().to_string()
}

/// Creates an account with `role` and logs it in
pub async fn signed_in(app: &Router, pool: &DbPool, email: &str, role: Role) -> String {
    create_account(pool, email, role).await;
    login(app, email).await
}

/// Lists an item through the API and returns the created item JSON
pub async fn list_item(app: &Router, token: &str, body: Value) -> Value {
    let (status, item) = call(app, Method::POST, "/api/items", Some(token), Some(body)).await;
    assert_eq!(status, StatusCode::OK, "create item failed: {}", item);
    item
}
