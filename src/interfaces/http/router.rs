//! API router

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::application::AuthService;
use crate::auth::auth_middleware;

use super::modules::{auth, health, request_id::request_id_middleware};

/// Create the API router with all routes
pub fn create_api_router(service: Arc<AuthService>) -> Router {
    let health_state = health::HealthState::new(service.users());

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh));

    // Auth routes (protected)
    let auth_protected_routes = Router::new()
        .route("/me", get(auth::me))
        .route_layer(middleware::from_fn_with_state(
            service.auth_state(),
            auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .with_state(health_state)
        .nest(
            "/api/v1/auth",
            auth_routes
                .merge(auth_protected_routes)
                .with_state(service),
        )
        .layer(middleware::from_fn(request_id_middleware))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
