//! Station Routes

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::{metrics::record_request, ApiError, AppState};

/// Station ids that report observations
pub async fn get_stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<String>>, ApiError> {
    record_request("stations");
    let stations = state.repository.list_stations().await?;
    Ok(Json(stations))
}
