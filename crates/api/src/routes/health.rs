//! Health and Metrics Routes

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

use crate::{ApiError, AppState};

/// Health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: String,
}

/// Report service version and whether the store answers
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let (status, database) = match state.repository.ping().await {
        Ok(()) => ("healthy", "ok"),
        Err(e) => {
            warn!(error = %e, "Store ping failed");
            ("degraded", "unavailable")
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        version: state.version.clone(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
        database: database.to_string(),
    })
}

/// Prometheus text exposition
pub async fn get_metrics(State(state): State<Arc<AppState>>) -> Result<String, ApiError> {
    state
        .metrics
        .as_ref()
        .map(|handle| handle.render())
        .ok_or(ApiError::NotFound("metrics exporter disabled"))
}
