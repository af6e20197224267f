//! Precipitation Routes

use axum::{extract::State, Json};
use climate_storage::PrecipitationReading;
use std::sync::Arc;

use crate::{metrics::record_request, ApiError, AppState};

/// Precipitation for the last year of recorded data
pub async fn get_precipitation(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<PrecipitationReading>>, ApiError> {
    record_request("precipitation");
    let readings = state.repository.recent_precipitation().await?;
    Ok(Json(readings))
}
