//! Health check handler

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use tracing::warn;

use crate::domain::UserStore;
use crate::interfaces::http::common::ApiResponse;

#[derive(Clone)]
pub struct HealthState {
    pub users: Arc<dyn UserStore>,
    pub started_at: Arc<Instant>,
}

impl HealthState {
    pub fn new(users: Arc<dyn UserStore>) -> Self {
        Self {
            users,
            started_at: Arc::new(Instant::now()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub storage: ComponentHealth,
}

#[derive(Debug, Serialize)]
pub struct ComponentHealth {
    pub status: String,
    pub latency_ms: Option<u64>,
}

/// `GET /health`. 503 when the user store does not answer; the health
/// report is still returned as `data` so callers can see which part failed.
pub async fn health_check(
    State(state): State<HealthState>,
) -> (StatusCode, Json<ApiResponse<HealthResponse>>) {
    let probe_start = Instant::now();
    let storage = match state.users.ping().await {
        Ok(()) => ComponentHealth {
            status: "ok".to_string(),
            latency_ms: Some(probe_start.elapsed().as_millis() as u64),
        },
        Err(e) => {
            warn!(error = %e, "Storage health probe failed");
            ComponentHealth {
                status: "error".to_string(),
                latency_ms: None,
            }
        }
    };

    let healthy = storage.status == "ok";
    let report = HealthResponse {
        status: if healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        storage,
    };

    if healthy {
        (StatusCode::OK, Json(ApiResponse::success(report)))
    } else {
        let mut body = ApiResponse::error("Storage unavailable.");
        body.data = Some(report);
        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}
