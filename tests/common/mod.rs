//! Shared helpers for HTTP-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{Request, Response};
use axum::Router;
use tower::ServiceExt;
use tweeter::auth::{JwtConfig, PasswordHasher};
use tweeter::domain::UserStore;
use tweeter::{create_api_router, init_database, AuthService, DatabaseConfig};
use tweeter::{InMemoryUserStore, SeaOrmUserStore};

pub const TEST_SECRET: &str = "integration-secret";

/// Lowest bcrypt cost, keeps the suite fast.
pub const TEST_BCRYPT_COST: u32 = 4;

pub fn build_app(users: Arc<dyn UserStore>) -> Router {
    let service = AuthService::new(
        users,
        &JwtConfig::new(TEST_SECRET),
        PasswordHasher::new(TEST_BCRYPT_COST),
    );
    create_api_router(Arc::new(service))
}

pub fn memory_app() -> Router {
    build_app(Arc::new(InMemoryUserStore::new()))
}

pub async fn sql_app() -> Router {
    let db = init_database(&DatabaseConfig::in_memory())
        .await
        .expect("in-memory database should initialise");
    build_app(Arc::new(SeaOrmUserStore::new(db)))
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    send(app, Request::builder().uri(uri).body(Body::empty()).unwrap()).await
}

pub async fn get_auth(app: &Router, uri: &str, token: &str) -> Response<Body> {
    let request = Request::builder()
        .uri(uri)
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap();
    send(app, request).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).expect("response body should be JSON")
}

pub fn signup_body(email: &str) -> serde_json::Value {
    serde_json::json!({
        "first_name": "John",
        "last_name": "Doe",
        "email": email,
        "birth_date": "1990-05-17",
        "password": "password123",
    })
}
