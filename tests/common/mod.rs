// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::response::Response;
use serde_json::{json, Value};
use std::sync::Arc;
use threadline::config::Config;
use threadline::db::{Database, FirestoreDb};
use threadline::routes::create_router;
use threadline::AppState;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a test app backed by the in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(Config::default(), Database::memory()));
    (create_router(state.clone()), state)
}

/// Build a request with an optional JSON body and session cookie.
#[allow(dead_code)]
pub fn request(method: Method, uri: &str, cookie: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Send a request and return status plus parsed JSON body.
#[allow(dead_code)]
pub async fn send(app: &axum::Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    (status, body_json(response).await)
}

/// Parse a response body as JSON (`Null` when empty).
#[allow(dead_code)]
pub async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

/// Pull `jwt=<token>` out of a response's Set-Cookie header.
#[allow(dead_code)]
pub fn session_cookie(response: &Response) -> String {
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("missing Set-Cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

/// A signed-up user as seen by tests.
#[allow(dead_code)]
pub struct TestUser {
    pub id: String,
    pub username: String,
    pub cookie: String,
}

/// Sign up `username` (email derived from it) and return its session.
#[allow(dead_code)]
pub async fn signup(app: &axum::Router, username: &str) -> TestUser {
    let body = json!({
        "name": format!("{username} Name"),
        "email": format!("{username}@example.com"),
        "username": username,
        "password": "hunter22",
    });
    let response = app
        .clone()
        .oneshot(request(Method::POST, "/api/users/signup", None, Some(body)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let cookie = session_cookie(&response);
    let profile = body_json(response).await;

    TestUser {
        id: profile["id"].as_str().unwrap().to_string(),
        username: username.to_string(),
        cookie,
    }
}

/// Create a post as `user` and return its ID.
#[allow(dead_code)]
pub async fn create_post(app: &axum::Router, user: &TestUser, text: &str) -> String {
    let (status, body) = send(
        app,
        request(
            Method::POST,
            "/api/posts/create",
            Some(&user.cookie),
            Some(json!({ "postedBy": user.id, "text": text })),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}
