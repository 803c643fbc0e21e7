//! Station History Routes

use axum::{
    extract::{Path, Query, State},
    Json,
};
use models::{StationSnapshot, StationsResponse};
use serde::Deserialize;

use crate::error::ApiError;
use crate::validation::{parse_kiosk_id, validate_timestamp};
use crate::SharedState;

/// `?at=` floor, RFC-3339
#[derive(Debug, Deserialize)]
pub struct FloorQuery {
    #[serde(default)]
    pub at: String,
}

/// Every snapshot since the floor, plus the current weather
pub async fn list_stations(
    State(state): State<SharedState>,
    Query(query): Query<FloorQuery>,
) -> Result<Json<StationsResponse>, ApiError> {
    let floor = validate_timestamp(&query.at)?;
    let ctx = state.request_context();

    let response = state
        .service
        .list_stations(&ctx, floor)
        .await
        .map_err(ApiError::ListStations)?;
    Ok(Json(response))
}

/// Latest snapshot of one kiosk since the floor
pub async fn get_station(
    State(state): State<SharedState>,
    Path(kiosk_id): Path<String>,
    Query(query): Query<FloorQuery>,
) -> Result<Json<StationSnapshot>, ApiError> {
    let floor = validate_timestamp(&query.at)?;
    let kiosk_id = parse_kiosk_id(&kiosk_id)?;

    let station = state
        .service
        .get_station(kiosk_id, floor)
        .await
        .map_err(ApiError::GetStation)?;
    Ok(Json(station))
}
