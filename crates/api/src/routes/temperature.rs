//! Temperature Routes

use axum::{
    extract::{Path, State},
    Json,
};
use climate_storage::{TemperatureReading, TemperatureStats};
use std::sync::Arc;

use crate::{metrics::record_request, ApiError, AppState};

/// Last year of temperatures from the most active station
pub async fn get_tobs(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<TemperatureReading>>, ApiError> {
    record_request("tobs");
    let readings = state.repository.most_active_station_temperatures().await?;
    Ok(Json(readings))
}

/// Temperature stats from `start` onwards
pub async fn get_stats_since(
    State(state): State<Arc<AppState>>,
    Path(start): Path<String>,
) -> Result<Json<TemperatureStats>, ApiError> {
    record_request("date_start");
    let stats = state.repository.temperature_stats(&start, None).await?;
    Ok(Json(stats))
}

/// Temperature stats over `start..=end`
pub async fn get_stats_between(
    State(state): State<Arc<AppState>>,
    Path((start, end)): Path<(String, String)>,
) -> Result<Json<TemperatureStats>, ApiError> {
    record_request("date_range");
    let stats = state
        .repository
        .temperature_stats(&start, Some(&end))
        .await?;
    Ok(Json(stats))
}
